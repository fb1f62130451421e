//! Provider test utilities

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use upstream_releases::release::{Lookup, LookupError, Provider, Release, ReleaseSet};

/// Provider with canned answers
pub struct StubProvider {
    name: &'static str,
    needle: Option<String>,
    lookup: Lookup,
    delay: Duration,
}

impl StubProvider {
    /// Matches nothing and fails as unavailable until configured
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            needle: None,
            lookup: Err(LookupError::Unavailable),
            delay: Duration::ZERO,
        }
    }

    /// Matches queries containing `needle`, answering with `needle` as the identifier
    pub fn matching(mut self, needle: &str) -> Self {
        self.needle = Some(needle.to_string());
        self
    }

    pub fn returning(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }

    /// Sleeps before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, query: &str) -> Option<String> {
        self.needle
            .as_ref()
            .filter(|needle| query.contains(needle.as_str()))
            .cloned()
    }

    async fn releases(&self, _name: &str) -> Lookup {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.lookup.clone()
    }
}

/// A set holding one undated release
pub fn single_release(name: &str, version: &str) -> ReleaseSet {
    let mut set = ReleaseSet::new(name);
    set.add(Release::new(
        name,
        version,
        format!("https://example.com/{}-{}.tar.gz", name, version),
        None,
    ));
    set
}
