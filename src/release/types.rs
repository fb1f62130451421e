//! Normalized release records

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// One release discovered upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Package name as the resolving provider knows it
    pub name: String,
    /// Version string exactly as upstream reports it
    pub version: String,
    /// URL of the release artifact
    pub location: String,
    /// Publish time, `None` when upstream gave nothing parseable
    pub published: Option<DateTime<Utc>>,
}

impl Release {
    /// Builds a release without validation so malformed upstream data stays visible.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        location: impl Into<String>,
        published: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            location: location.into(),
            published,
        }
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let published = self
            .published
            .map(|p| p.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{:<20} {:<12} {:<19} {}",
            self.name, self.version, published, self.location
        )
    }
}

/// Releases of one package, at most one per `(name, version)`
///
/// Insertion never sorts; [`ReleaseSet::iter`] yields newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseSet {
    query: String,
    releases: IndexMap<(String, String), Release>,
}

impl ReleaseSet {
    /// Creates an empty set tagged with the name it was looked up by
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            releases: IndexMap::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Adds a release, replacing an earlier one with the same name and version
    pub fn add(&mut self, release: Release) {
        let key = (release.name.clone(), release.version.clone());
        self.releases.insert(key, release);
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Newest release, or `None` for an empty set
    pub fn first(&self) -> Option<&Release> {
        self.iter().next()
    }

    /// Releases newest first; undated releases come last, ties keep insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Release> {
        let mut sorted: Vec<&Release> = self.releases.values().collect();
        sorted.sort_by(|a, b| newest_first(a, b));
        sorted.into_iter()
    }
}

fn newest_first(a: &Release, b: &Release) -> Ordering {
    match (a.published, b.published) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Serialize for ReleaseSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
