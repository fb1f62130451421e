//! Provider trait for resolving releases from one upstream service

#[cfg(test)]
use mockall::automock;

use crate::release::status::{Lookup, LookupError};
use crate::release::types::Release;

/// An adapter for one upstream release-hosting service
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable name of the upstream service
    fn name(&self) -> &'static str;

    /// Checks whether this provider understands `query`
    ///
    /// `query` may be a full artifact URL, a project URL or a fragment of one.
    /// Performs no I/O.
    ///
    /// # Returns
    /// * `Some(id)` - Identifier that [`Provider::releases`] accepts
    /// * `None` - This provider cannot resolve the query
    fn matches(&self, query: &str) -> Option<String>;

    /// Fetches every release upstream lists for `name`
    ///
    /// # Arguments
    /// * `name` - Identifier returned by [`Provider::matches`], or a bare package name
    ///
    /// # Returns
    /// * `Ok(ReleaseSet)` - At least one release
    /// * `Err(LookupError::NotFound)` - HTTP 404, or nothing convertible in the response
    /// * `Err(LookupError::Unavailable)` - Any other status, transport or decode failure
    async fn releases(&self, name: &str) -> Lookup;

    /// Newest release upstream lists for `name`
    async fn latest(&self, name: &str) -> Result<Release, LookupError> {
        let releases = self.releases(name).await?;
        releases.first().cloned().ok_or(LookupError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::types::ReleaseSet;
    use chrono::{TimeZone, Utc};

    /// Provider relying on the default `latest`
    struct FixedProvider(Lookup);

    #[async_trait::async_trait]
    impl Provider for FixedProvider {
        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn matches(&self, query: &str) -> Option<String> {
            Some(query.to_string())
        }

        async fn releases(&self, _name: &str) -> Lookup {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn latest_returns_newest_release() {
        let mut set = ReleaseSet::new("pkg");
        set.add(Release::new(
            "pkg",
            "1.0",
            "https://x/1.0",
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        ));
        set.add(Release::new(
            "pkg",
            "2.0",
            "https://x/2.0",
            Some(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()),
        ));

        let provider = FixedProvider(Ok(set));
        let latest = provider.latest("pkg").await.unwrap();

        assert_eq!(latest.version, "2.0");
    }

    #[tokio::test]
    async fn latest_propagates_lookup_failure() {
        let provider = FixedProvider(Err(LookupError::Unavailable));

        assert_eq!(
            provider.latest("pkg").await,
            Err(LookupError::Unavailable)
        );
    }

    #[tokio::test]
    async fn latest_on_empty_set_is_not_found() {
        let provider = FixedProvider(Ok(ReleaseSet::new("pkg")));

        assert_eq!(provider.latest("pkg").await, Err(LookupError::NotFound));
    }
}
