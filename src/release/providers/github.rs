//! GitHub Releases API provider

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::USER_AGENT;
use crate::release::error::FetchError;
use crate::release::http;
use crate::release::provider::Provider;
use crate::release::status::Lookup;
use crate::release::types::{Release, ReleaseSet};

/// Default base URL for GitHub API
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Any URL inside a repository; groups are owner and repository
static REPO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([\w.-]+)/([\w.-]+?)(?:\.git)?(?:[/?#].*)?$")
        .expect("valid GitHub repository regex")
});

/// Response from GitHub Releases API
///
/// Fields are optional so one odd entry is skipped instead of failing the list.
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    tarball_url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
}

/// Provider implementation for GitHub Releases
pub struct GitHubProvider {
    client: Client,
    base_url: String,
}

impl GitHubProvider {
    /// Creates a new GitHubProvider with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_client(
            Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
        )
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    async fn fetch(&self, name: &str) -> Result<ReleaseSet, FetchError> {
        let (owner, repo) = name
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| FetchError::InvalidName(name.to_string()))?;

        let url = format!("{}/repos/{}/{}/releases", self.base_url, owner, repo);
        let response = http::get(&self.client, &url, name).await?;

        let releases: Vec<GitHubRelease> = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        let set = convert(releases, owner, repo);
        debug!("Found {} stable releases for {}", set.len(), name);

        if set.is_empty() {
            return Err(FetchError::NoReleases(name.to_string()));
        }
        Ok(set)
    }
}

impl Default for GitHubProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Keeps published, non-prerelease entries
fn convert(releases: Vec<GitHubRelease>, owner: &str, repo: &str) -> ReleaseSet {
    let mut set = ReleaseSet::new(format!("{}/{}", owner, repo));
    for release in releases {
        if release.draft || release.prerelease {
            continue;
        }
        let Some(tag) = release.tag_name else {
            debug!("Skipping {}/{} release without a tag", owner, repo);
            continue;
        };
        let location = release.tarball_url.unwrap_or_else(|| {
            format!("https://github.com/{}/{}/archive/{}.tar.gz", owner, repo, tag)
        });
        let published = release.published_at.as_deref().and_then(parse_published_at);
        set.add(Release::new(repo, tag, location, published));
    }
    set
}

/// Parses `published_at` as RFC 3339, `None` when unparseable
fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[async_trait]
impl Provider for GitHubProvider {
    fn name(&self) -> &'static str {
        "GitHub"
    }

    fn matches(&self, query: &str) -> Option<String> {
        let caps = REPO_REGEX.captures(query)?;
        Some(format!("{}/{}", &caps[1], &caps[2]))
    }

    async fn releases(&self, name: &str) -> Lookup {
        self.fetch(name).await.map_err(|e| e.fold(self.name()))
    }
}
