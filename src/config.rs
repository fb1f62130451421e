use serde::Deserialize;
use std::time::Duration;

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for a single provider lookup in milliseconds (30 seconds)
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 30_000;

/// Timeout for establishing a connection in milliseconds (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Providers queried at the same time
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// User agent sent to every upstream
pub const USER_AGENT: &str = concat!("upstream-releases/", env!("CARGO_PKG_VERSION"));

/// Resolver configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Per-provider lookup timeout in milliseconds
    pub provider_timeout_ms: u64,
    /// Timeout for the whole resolution in milliseconds, unbounded when absent
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: u64,
    pub max_concurrent: usize,
    pub providers: ProvidersConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
            timeout_ms: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            providers: ProvidersConfig::default(),
        }
    }
}

impl ResolverConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Concurrency limit, never below one
    pub fn concurrency(&self) -> usize {
        self.max_concurrent.max(1)
    }
}

/// Provider-specific configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub pypi: ProviderConfig,
    pub sourceforge: ProviderConfig,
    pub github: ProviderConfig,
}

impl ProvidersConfig {
    /// Disables a provider by its display name, case-insensitively.
    /// Returns false for an unknown name.
    pub fn disable(&mut self, name: &str) -> bool {
        let config = match name.to_ascii_lowercase().as_str() {
            "pypi" => &mut self.pypi,
            "sourceforge" => &mut self.sourceforge,
            "github" => &mut self.github,
            _ => return false,
        };
        config.enabled = false;
        true
    }
}

/// Individual provider configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
