//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use privatezone_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Malformed local input (non-positive page/batch size, malformed zone ID, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Remote store error (transport failure or API soft error)
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Remote error while operating on a whole zone
    #[error("zone {zone_id}: {source}")]
    Zone {
        zone_id: String,
        source: ProviderError,
    },

    /// Remote error while operating on one record set of a zone
    #[error("zone {zone_id}, {record_type} record '{host}': {source}")]
    Record {
        zone_id: String,
        host: String,
        record_type: String,
        source: ProviderError,
    },

    /// Deadline elapsed; remote side effects already applied are kept
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl CoreError {
    /// 包装为 zone 级错误
    pub(crate) fn zone(zone_id: &str) -> impl FnOnce(ProviderError) -> Self + '_ {
        move |source| Self::Zone {
            zone_id: zone_id.to_string(),
            source,
        }
    }

    /// 包装为记录级错误
    pub(crate) fn record<'a>(
        zone_id: &'a str,
        host: &'a str,
        record_type: &'a str,
    ) -> impl FnOnce(ProviderError) -> Self + 'a {
        move |source| Self::Record {
            zone_id: zone_id.to_string(),
            host: host.to_string(),
            record_type: record_type.to_string(),
            source,
        }
    }

    /// The underlying remote error, looking through zone/record context.
    #[must_use]
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) | Self::Zone { source: e, .. } | Self::Record { source: e, .. } => {
                Some(e)
            }
            Self::InvalidArgument(_) | Self::Cancelled(_) => None,
        }
    }

    /// 是否为远端错误（传输失败或 API 软错误）
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.provider_error().is_some()
    }

    /// Whether it is expected behavior (bad input, resource does not exist, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidArgument(_) => true,
            Self::Cancelled(_) => false,
            Self::Provider(e) | Self::Zone { source: e, .. } | Self::Record { source: e, .. } => {
                e.is_expected()
            }
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: "volcengine".to_string(),
            zone: "1".to_string(),
            raw_message: None,
        }
    }

    #[test]
    fn context_wrappers_are_remote() {
        let e = CoreError::zone("1")(not_found());
        assert!(e.is_remote());
        assert!(e.is_expected());
        assert_eq!(e.to_string(), "zone 1: [volcengine] Zone '1' not found");

        let e = CoreError::record("1", "www", "A")(not_found());
        assert!(e.is_remote());
        assert!(matches!(
            e.provider_error(),
            Some(ProviderError::ZoneNotFound { .. })
        ));
        assert_eq!(
            e.to_string(),
            "zone 1, A record 'www': [volcengine] Zone '1' not found"
        );
    }

    #[test]
    fn local_errors_are_not_remote() {
        assert!(!CoreError::InvalidArgument("x".into()).is_remote());
        assert!(!CoreError::Cancelled("x".into()).is_remote());
        assert!(!CoreError::Cancelled("x".into()).is_expected());
    }

    #[test]
    fn serializes_with_code_and_details() {
        let json = serde_json::to_value(CoreError::InvalidArgument("bad".into())).unwrap();
        assert_eq!(json["code"], "InvalidArgument");
        assert_eq!(json["details"], "bad");

        let json = serde_json::to_value(CoreError::zone("9")(not_found())).unwrap();
        assert_eq!(json["code"], "Zone");
        assert_eq!(json["details"]["zone_id"], "9");
        assert_eq!(json["details"]["source"]["code"], "ZoneNotFound");
    }
}
