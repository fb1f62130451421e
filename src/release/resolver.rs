//! Resolution across every registered provider
//!
//! Each provider is probed with the query; matching providers are asked for
//! their releases concurrently, bounded by the configured limit. Reports come
//! back in registry order regardless of completion order. A failing or slow
//! provider never prevents the others from reporting.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::release::provider::Provider;
use crate::release::providers::ProviderRegistry;
use crate::release::status::Status;
use crate::release::types::{Release, ReleaseSet};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolution timed out after {0:?}")]
    TimedOut(Duration),
}

/// What one provider contributed to a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The provider did not recognize the query
    NoMatch,
    /// The provider matched and returned releases
    Found(ReleaseSet),
    /// The provider matched but the lookup failed
    Failed { status: Status, timed_out: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReport {
    pub provider: &'static str,
    pub outcome: Outcome,
}

impl ProviderReport {
    pub fn status(&self) -> Option<Status> {
        match &self.outcome {
            Outcome::NoMatch => None,
            Outcome::Found(_) => Some(Status::Ok),
            Outcome::Failed { status, .. } => Some(*status),
        }
    }
}

/// Aggregated result of resolving one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub query: String,
    /// One report per registered provider, in registry order
    pub reports: Vec<ProviderReport>,
}

impl Resolution {
    /// True when at least one provider returned releases
    pub fn is_found(&self) -> bool {
        self.found().next().is_some()
    }

    /// Release sets of every successful provider
    pub fn found(&self) -> impl Iterator<Item = (&'static str, &ReleaseSet)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            Outcome::Found(set) => Some((r.provider, set)),
            _ => None,
        })
    }

    /// Providers that matched but failed
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, Status)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            Outcome::Failed { status, .. } => Some((r.provider, *status)),
            _ => None,
        })
    }

    pub fn release_count(&self) -> usize {
        self.found().map(|(_, set)| set.len()).sum()
    }

    /// Newest release per successful provider
    pub fn latest(&self) -> impl Iterator<Item = (&'static str, &Release)> {
        self.found()
            .filter_map(|(provider, set)| set.first().map(|release| (provider, release)))
    }
}

/// Resolves queries against an injected provider registry
pub struct Resolver {
    registry: ProviderRegistry,
    provider_timeout: Duration,
    overall_timeout: Option<Duration>,
    concurrency: usize,
}

impl Resolver {
    pub fn new(registry: ProviderRegistry, config: &ResolverConfig) -> Self {
        Self {
            registry,
            provider_timeout: config.provider_timeout(),
            overall_timeout: config.timeout(),
            concurrency: config.concurrency(),
        }
    }

    /// Resolves `query` against every provider
    ///
    /// When the overall timeout expires every in-flight lookup is dropped,
    /// closing its connection, and no partial result is returned.
    pub async fn resolve(&self, query: &str) -> Result<Resolution, ResolveError> {
        match self.overall_timeout {
            Some(limit) => timeout(limit, self.resolve_all(query))
                .await
                .map_err(|_| ResolveError::TimedOut(limit)),
            None => Ok(self.resolve_all(query).await),
        }
    }

    async fn resolve_all(&self, query: &str) -> Resolution {
        debug!("Resolving {} against {} provider(s)", query, self.registry.len());
        let reports = stream::iter(self.registry.providers())
            .map(|provider| self.resolve_one(provider.as_ref(), query))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Resolution {
            query: query.to_string(),
            reports,
        }
    }

    async fn resolve_one(&self, provider: &dyn Provider, query: &str) -> ProviderReport {
        let name = provider.name();
        debug!("{} checking for match", name);

        let Some(id) = provider.matches(query) else {
            debug!("{} does not match", name);
            return ProviderReport {
                provider: name,
                outcome: Outcome::NoMatch,
            };
        };
        info!("{} matched {}", name, id);

        let outcome = match timeout(self.provider_timeout, provider.releases(&id)).await {
            Ok(Ok(set)) => {
                info!("{} found {} release(s)", name, set.len());
                Outcome::Found(set)
            }
            Ok(Err(e)) => {
                let status = e.status();
                warn!(
                    "{} failed to fetch releases, code: {} ({})",
                    name,
                    status.code(),
                    status
                );
                Outcome::Failed {
                    status,
                    timed_out: false,
                }
            }
            Err(_) => {
                warn!(
                    "{} timed out after {:?}",
                    name, self.provider_timeout
                );
                Outcome::Failed {
                    status: Status::Unavailable,
                    timed_out: true,
                }
            }
        };

        ProviderReport {
            provider: name,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::provider::MockProvider;
    use crate::release::status::{Lookup, LookupError};
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn one_release(name: &str, version: &str) -> ReleaseSet {
        let mut set = ReleaseSet::new(name);
        set.add(Release::new(
            name,
            version,
            format!("https://x/{}-{}.tar.gz", name, version),
            None,
        ));
        set
    }

    fn mock_provider(
        name: &'static str,
        matched: Option<&'static str>,
        lookup: Option<Lookup>,
    ) -> MockProvider {
        let mut provider = MockProvider::new();
        provider.expect_name().return_const(name);
        provider
            .expect_matches()
            .returning(move |_| matched.map(str::to_string));
        match lookup {
            Some(lookup) => {
                provider
                    .expect_releases()
                    .times(1)
                    .returning(move |_| lookup.clone());
            }
            None => {
                provider.expect_releases().never();
            }
        }
        provider
    }

    fn resolver(providers: Vec<MockProvider>, config: ResolverConfig) -> Resolver {
        let providers = providers
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn Provider>)
            .collect();
        Resolver::new(ProviderRegistry::new(providers), &config)
    }

    #[tokio::test]
    async fn one_success_and_one_failure_is_found() {
        let resolver = resolver(
            vec![
                mock_provider("Good", Some("pkg"), Some(Ok(one_release("pkg", "1.0")))),
                mock_provider("Down", Some("pkg"), Some(Err(LookupError::Unavailable))),
            ],
            ResolverConfig::default(),
        );

        let resolution = resolver.resolve("pkg").await.unwrap();

        assert!(resolution.is_found());
        assert_eq!(resolution.release_count(), 1);
        assert_eq!(
            resolution.failures().collect::<Vec<_>>(),
            vec![("Down", Status::Unavailable)]
        );
    }

    #[tokio::test]
    async fn non_matching_providers_are_never_fetched() {
        let resolver = resolver(
            vec![
                mock_provider("Skip", None, None),
                mock_provider("Good", Some("pkg"), Some(Ok(one_release("pkg", "2.0")))),
            ],
            ResolverConfig::default(),
        );

        let resolution = resolver.resolve("pkg").await.unwrap();

        assert_eq!(resolution.reports[0].outcome, Outcome::NoMatch);
        assert_eq!(resolution.reports[0].status(), None);
        assert_eq!(resolution.reports[1].status(), Some(Status::Ok));
    }

    #[tokio::test]
    async fn releases_receive_the_matched_identifier() {
        let mut provider = MockProvider::new();
        provider.expect_name().return_const("Rewrite");
        provider
            .expect_matches()
            .returning(|_| Some("canonical".to_string()));
        provider
            .expect_releases()
            .with(eq("canonical"))
            .times(1)
            .returning(|name| Ok(one_release(name, "1.0")));

        let resolver = resolver(vec![provider], ResolverConfig::default());
        let resolution = resolver.resolve("https://host/raw/query").await.unwrap();

        assert!(resolution.is_found());
        assert_eq!(resolution.query, "https://host/raw/query");
    }

    #[tokio::test]
    async fn all_failures_are_not_found() {
        let resolver = resolver(
            vec![
                mock_provider("Missing", Some("pkg"), Some(Err(LookupError::NotFound))),
                mock_provider("Skip", None, None),
            ],
            ResolverConfig::default(),
        );

        let resolution = resolver.resolve("pkg").await.unwrap();

        assert!(!resolution.is_found());
        assert_eq!(resolution.release_count(), 0);
        assert_eq!(resolution.latest().count(), 0);
    }

    #[tokio::test]
    async fn reports_keep_registry_order_with_bounded_concurrency() {
        let resolver = resolver(
            vec![
                mock_provider("A", Some("a"), Some(Ok(one_release("a", "1")))),
                mock_provider("B", Some("b"), Some(Err(LookupError::NotFound))),
                mock_provider("C", Some("c"), Some(Ok(one_release("c", "3")))),
            ],
            ResolverConfig {
                max_concurrent: 1,
                ..Default::default()
            },
        );

        let resolution = resolver.resolve("q").await.unwrap();

        let order: Vec<&str> = resolution.reports.iter().map(|r| r.provider).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        let latest: Vec<(&str, &str)> = resolution
            .latest()
            .map(|(p, r)| (p, r.version.as_str()))
            .collect();
        assert_eq!(latest, vec![("A", "1"), ("C", "3")]);
    }

    #[tokio::test]
    async fn empty_registry_finds_nothing() {
        let resolver = Resolver::new(ProviderRegistry::new(vec![]), &ResolverConfig::default());

        let resolution = resolver.resolve("anything").await.unwrap();

        assert!(resolution.reports.is_empty());
        assert!(!resolution.is_found());
    }
}
