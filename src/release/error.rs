use thiserror::Error;
use tracing::{error, warn};

use crate::release::status::LookupError;

/// Detailed adapter failure, folded into [`LookupError`] at the provider boundary
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No usable releases for {0}")]
    NoReleases(String),

    #[error("Name not understood by provider: {0}")]
    InvalidName(String),
}

impl FetchError {
    /// Folds the error into the boundary taxonomy, logging the detail that is dropped
    pub fn fold(self, provider: &str) -> LookupError {
        match self {
            FetchError::NotFound(_) | FetchError::NoReleases(_) => {
                warn!("{}: {}", provider, self);
                LookupError::NotFound
            }
            FetchError::InvalidName(_) => {
                error!("{}: contract violation: {}", provider, self);
                LookupError::Unavailable
            }
            FetchError::Network(_)
            | FetchError::UnexpectedStatus { .. }
            | FetchError::InvalidResponse(_) => {
                warn!("{}: {}", provider, self);
                LookupError::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FetchError::NotFound("pkg".into()), LookupError::NotFound)]
    #[case(FetchError::NoReleases("pkg".into()), LookupError::NotFound)]
    #[case(FetchError::UnexpectedStatus { status: 500, url: "https://x".into() }, LookupError::Unavailable)]
    #[case(FetchError::InvalidResponse("bad json".into()), LookupError::Unavailable)]
    #[case(FetchError::InvalidName("???".into()), LookupError::Unavailable)]
    fn fold_maps_to_boundary_taxonomy(#[case] error: FetchError, #[case] expected: LookupError) {
        assert_eq!(error.fold("Test"), expected);
    }
}
