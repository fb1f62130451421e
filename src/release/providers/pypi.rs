//! PyPI provider: JSON index keyed by version

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::release::error::FetchError;
use crate::release::http;
use crate::release::provider::Provider;
use crate::release::status::Lookup;
use crate::release::types::{Release, ReleaseSet};

pub(crate) const DEFAULT_PYPI_REGISTRY: &str = "https://pypi.org";

/// Format of `upload_time` in the PyPI JSON API
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Source artifact hosted by PyPI; group 1 is the package name
static SOURCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:files\.pythonhosted\.org|pypi\.(?:python\.org|io))/packages/(?:[^/]+/)*([^/]+?)-\d[^/]*\.(?:tar\.(?:gz|bz2|xz)|zip)$",
    )
    .expect("valid PyPI source regex")
});

/// Project page on PyPI; group 1 is the package name
static PROJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://pypi\.(?:org|python\.org)/(?:project|pypi)/([^/]+)")
        .expect("valid PyPI project regex")
});

/// PyPI provider
pub struct PypiProvider {
    client: Client,
    base_url: String,
}

impl Default for PypiProvider {
    fn default() -> Self {
        Self::new(DEFAULT_PYPI_REGISTRY.to_string())
    }
}

impl PypiProvider {
    pub fn new(base_url: String) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn fetch(&self, name: &str) -> Result<ReleaseSet, FetchError> {
        let url = format!("{}/pypi/{}/json", self.base_url, name);
        let response = http::get(&self.client, &url, name).await?;

        let index: PypiResponse = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        let releases = index.convert(name);
        debug!("Found {} releases for package {}", releases.len(), name);

        if releases.is_empty() {
            return Err(FetchError::NoReleases(name.to_string()));
        }
        Ok(releases)
    }
}

/// PyPI JSON API response structure
#[derive(Debug, Deserialize)]
struct PypiResponse {
    #[serde(default)]
    releases: IndexMap<String, Vec<PypiFile>>,
}

/// One uploaded file of a release; either field may be absent or null upstream
#[derive(Debug, Deserialize)]
struct PypiFile {
    #[serde(default)]
    upload_time: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl PypiResponse {
    /// Converts the index into releases, one per version.
    /// The last file listed for a version is its canonical artifact; versions
    /// without files, or whose last file has no url, are skipped.
    fn convert(&self, name: &str) -> ReleaseSet {
        let mut set = ReleaseSet::new(name);
        for (version, files) in &self.releases {
            let Some(file) = files.last() else {
                continue;
            };
            let Some(url) = file.url.as_deref() else {
                debug!("Skipping {} {}: last file has no url", name, version);
                continue;
            };
            set.add(Release::new(
                name,
                version.as_str(),
                url,
                file.upload_time.as_deref().and_then(parse_upload_time),
            ));
        }
        set
    }
}

/// Parses `upload_time` as UTC, `None` when it does not fit [`DATE_FORMAT`]
fn parse_upload_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl Provider for PypiProvider {
    fn name(&self) -> &'static str {
        "PyPI"
    }

    fn matches(&self, query: &str) -> Option<String> {
        SOURCE_REGEX
            .captures(query)
            .or_else(|| PROJECT_REGEX.captures(query))
            .map(|caps| caps[1].to_string())
    }

    async fn releases(&self, name: &str) -> Lookup {
        self.fetch(name).await.map_err(|e| e.fold(self.name()))
    }
}
