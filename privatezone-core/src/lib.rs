//! Private zone reconciliation core
//!
//! Keeps the records of Volcengine private zones in line with the endpoints
//! external-dns wants:
//! - zone discovery and owning-zone resolution ([`ZoneDirectory`])
//! - zone-scoped record CRUD over paginated, batched API calls ([`RecordStore`])
//! - endpoint collapsing and change application ([`Reconciler`])
//!
//! The remote API is reached through [`privatezone_provider::PrivateZoneApi`],
//! so the engine runs against the real client or an in-memory store alike.

pub mod error;
pub mod services;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    Reconciler, ReconcilerOptions, RecordStore, UpdateStrategy, ZoneDirectory, ZoneIndex,
};
pub use types::{Changes, DomainFilter, Endpoint, ProviderSpecificProperty};
