//! Type definition module

mod changes;
mod domain_filter;
mod endpoint;

pub use changes::Changes;
pub use domain_filter::DomainFilter;
pub use endpoint::{Endpoint, ProviderSpecificProperty};

// Re-export library types
pub use privatezone_provider::{NewRecord, PaginatedResponse, PaginationParams, PrivateZone, ZoneRecord};
