pub mod provider;

pub use provider::{StubProvider, single_release};
