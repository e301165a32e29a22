//! # privatezone-provider
//!
//! Client for the Volcengine Private Zone OpenAPI, the record store behind the
//! private zone external-dns webhook.
//!
//! The crate exposes one remote operation per [`PrivateZoneApi`] method. It does
//! not paginate or batch on its own; callers drive paging with
//! [`PaginationParams`] and decide batch sizes.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for static or cross-compiled builds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use privatezone_provider::{PaginationParams, PrivateZoneApi, VolcengineProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = VolcengineProvider::builder("ak".to_string(), "sk".to_string())
//!         .region("cn-beijing")
//!         .build()?;
//!
//!     let zones = provider
//!         .list_private_zones(Some("vpc-123"), &PaginationParams::default())
//!         .await?;
//!     for zone in &zones.items {
//!         println!("{} ({})", zone.zone_name, zone.zone_id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Credentials
//!
//! [`VolcengineProvider::builder`] signs with a static access key pair.
//! [`VolcengineProvider::oidc_builder`] instead exchanges an OIDC token file for
//! STS credentials (`AssumeRoleWithOIDC`), caches them and refreshes them
//! shortly before they expire:
//!
//! ```rust,no_run
//! use privatezone_provider::{OidcConfig, VolcengineProvider};
//!
//! # fn main() -> privatezone_provider::Result<()> {
//! let provider = VolcengineProvider::oidc_builder(
//!     OidcConfig::new(
//!         "trn:iam::2100000000:role/external-dns",
//!         "/var/run/secrets/vke/tokens/vke-oidc-token",
//!     ),
//! )
//! .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ProviderError>`](ProviderError). A soft
//! error carried in the response envelope of an HTTP 200 is surfaced as an error,
//! never as success. Transient errors (`NetworkError`, `Timeout`, `RateLimited`)
//! are retried with exponential backoff before being returned.

mod error;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export the API trait (internal traits are not exported)
pub use traits::PrivateZoneApi;

// Re-export types
pub use types::{NewRecord, PaginatedResponse, PaginationParams, PrivateZone, ZoneRecord};

// Re-export utils
pub use utils::datetime;
pub use utils::log_sanitizer::mask_secret;

pub use providers::{OidcConfig, VolcengineProvider, VolcengineProviderBuilder};
