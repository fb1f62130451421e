//! Three-way outcome of a provider lookup

use std::fmt;

use thiserror::Error;

use crate::release::types::ReleaseSet;

/// Outcome of a single provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Upstream answered and the lookup produced releases
    Ok,
    /// Upstream answered but knows no such package, or listed nothing usable
    NotFound,
    /// Upstream could not be reached or sent something we could not read
    Unavailable,
}

impl Status {
    /// Numeric code shown in console failure lines
    pub fn code(&self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::NotFound => 1,
            Status::Unavailable => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NotFound => "NotFound",
            Status::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only failure shape that crosses the provider boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no such package upstream")]
    NotFound,

    #[error("upstream unavailable")]
    Unavailable,
}

impl LookupError {
    pub fn status(&self) -> Status {
        match self {
            LookupError::NotFound => Status::NotFound,
            LookupError::Unavailable => Status::Unavailable,
        }
    }
}

/// Result of [`Provider::releases`](crate::release::provider::Provider::releases)
pub type Lookup = Result<ReleaseSet, LookupError>;

impl From<&Lookup> for Status {
    fn from(lookup: &Lookup) -> Self {
        match lookup {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }
}
