//! Remote API implementations

/// Shared utilities used by provider implementations.
pub mod common;

mod volcengine;

pub use volcengine::{OidcConfig, VolcengineProvider, VolcengineProviderBuilder};
