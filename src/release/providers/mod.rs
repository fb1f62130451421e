//! Provider implementations and the registry that lists them

pub mod github;
pub mod pypi;
pub mod sourceforge;

pub use github::GitHubProvider;
pub use pypi::PypiProvider;
pub use sourceforge::SourceForgeProvider;

use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::release::http;
use crate::release::provider::Provider;

/// Fixed, ordered set of providers
///
/// Order is the order the resolver reports in. Built once and handed to
/// [`Resolver`](crate::release::resolver::Resolver).
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Every compiled-in provider with default settings
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::from_config(&ResolverConfig::default())
    }

    /// Every compiled-in provider enabled by `config`, sharing one HTTP client
    pub fn from_config(config: &ResolverConfig) -> Result<Self, reqwest::Error> {
        let client = http::build_client(config.connect_timeout())?;
        let enabled = &config.providers;

        let mut providers: Vec<Arc<dyn Provider>> = Vec::new();
        if enabled.pypi.enabled {
            providers.push(Arc::new(PypiProvider::with_client(
                client.clone(),
                pypi::DEFAULT_PYPI_REGISTRY.to_string(),
            )));
        }
        if enabled.sourceforge.enabled {
            providers.push(Arc::new(SourceForgeProvider::with_client(
                client.clone(),
                sourceforge::DEFAULT_BASE_URL.to_string(),
            )));
        }
        if enabled.github.enabled {
            providers.push(Arc::new(GitHubProvider::with_client(
                client,
                github::DEFAULT_BASE_URL,
            )));
        }

        Ok(Self::new(providers))
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
