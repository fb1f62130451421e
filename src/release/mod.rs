//! Release resolution layer
//!
//! Turns a user query (artifact URL, project URL) into the releases that one
//! or more upstream services publish for it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Resolver   │────▶│  Registry   │────▶│  Provider   │
//! │ (fan-out)   │     │  (ordered)  │     │ (match/get) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │ Resolution  │◀────────────────────────│ ReleaseSet  │
//! │ (reports)   │                         │  / Status   │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`provider`]: Provider trait implemented by every upstream adapter
//! - [`providers`]: Concrete adapters (PyPI, SourceForge, GitHub) and the registry
//! - [`resolver`]: Concurrent resolution across all providers
//! - [`types`]: `Release` and `ReleaseSet`
//! - [`status`]: Three-way lookup status
//! - [`error`]: Adapter-internal error detail
//! - [`http`]: Shared HTTP client and status classification

pub mod error;
pub mod http;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod status;
pub mod types;

pub use provider::Provider;
pub use providers::ProviderRegistry;
pub use resolver::{Outcome, ProviderReport, Resolution, ResolveError, Resolver};
pub use status::{Lookup, LookupError, Status};
pub use types::{Release, ReleaseSet};
