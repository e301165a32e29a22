//! Volcengine error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::VolcengineProvider;

/// Volcengine error code mapping
/// Reference: <https://www.volcengine.com/docs/6758/155094>
impl ProviderErrorMapper for VolcengineProvider {
    fn provider_name(&self) -> &'static str {
        "volcengine"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // ============ Authentication error ============
            Some(
                "MissingAuthenticationToken"
                | "InvalidAuthorization"
                | "InvalidAccessKey"
                | "InvalidCredential"
                | "SignatureDoesNotMatch"
                | "InvalidSecretToken"
                | "InvalidTimestamp",
            ) => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // ============ Permission denied ============
            Some("AccessDenied" | "Forbidden" | "OperationDenied" | "NotAuthorized") => {
                ProviderError::PermissionDenied {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            // ============ Frequency limit (can be retried) ============
            Some("FlowLimitExceeded" | "Throttling" | "RequestLimitExceeded" | "TooManyRequests") => {
                ProviderError::RateLimited {
                    provider: self.provider_name().to_string(),
                    retry_after: None,
                    raw_message: Some(raw.message),
                }
            }

            // ============ Quota limit ============
            Some("QuotaExceeded" | "RecordQuotaExceeded" | "LimitExceeded") => {
                ProviderError::QuotaExceeded {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            // ============ Record already exists ============
            Some("RecordAlreadyExists" | "RecordExists" | "RecordDuplicate" | "DuplicateRecord") => {
                ProviderError::RecordExists {
                    provider: self.provider_name().to_string(),
                    record_name: context
                        .record_name
                        .unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                }
            }

            // ============ Record does not exist ============
            Some("RecordNotFound" | "RecordNotExists" | "InvalidRecordID.NotFound") => {
                ProviderError::RecordNotFound {
                    provider: self.provider_name().to_string(),
                    record_id: context.record_id.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                }
            }

            // ============ Zone does not exist ============
            Some("ZoneNotFound" | "ZoneNotExists" | "InvalidZID.NotFound") => {
                ProviderError::ZoneNotFound {
                    provider: self.provider_name().to_string(),
                    zone: context.zone.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                }
            }

            // ============ Invalid parameter ============
            // `InvalidParameter.Host` / `MissingParameter.ZID` 等，点号后为参数名
            Some(code)
                if code.starts_with("InvalidParameter")
                    || code.starts_with("MissingParameter")
                    || code.starts_with("InvalidRecord") =>
            {
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: code
                        .split_once('.')
                        .map_or_else(|| "request".to_string(), |(_, p)| p.to_string()),
                    detail: raw.message,
                }
            }

            // ============ Transient server errors ============
            Some("InternalError" | "InternalServiceError" | "ServiceUnavailableTemp") => {
                ProviderError::NetworkError {
                    provider: self.provider_name().to_string(),
                    detail: raw.message,
                }
            }

            // ============ Other errors fallback ============
            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> VolcengineProvider {
        VolcengineProvider::new(String::new(), String::new()).unwrap()
    }

    fn default_ctx() -> ErrorContext {
        ErrorContext::default()
    }

    // ---- Authentication error ----

    #[test]
    fn auth_codes_map_to_invalid_credentials() {
        let p = provider();
        for code in [
            "MissingAuthenticationToken",
            "SignatureDoesNotMatch",
            "InvalidAccessKey",
        ] {
            let err = p.map_error(RawApiError::with_code(code, "auth failed"), default_ctx());
            assert!(
                matches!(err, ProviderError::InvalidCredentials { .. }),
                "expected InvalidCredentials for code '{code}', got {err:?}"
            );
        }
    }

    #[test]
    fn access_denied_maps_to_permission_denied() {
        let err = provider().map_error(
            RawApiError::with_code("AccessDenied", "no"),
            default_ctx(),
        );
        assert!(matches!(err, ProviderError::PermissionDenied { .. }));
    }

    // ---- Frequency limit ----

    #[test]
    fn flow_limit_is_retryable() {
        let err = provider().map_error(
            RawApiError::with_code("FlowLimitExceeded", "slow down"),
            default_ctx(),
        );
        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert!(err.is_retryable());
    }

    // ---- Record / zone not found ----

    #[test]
    fn record_not_found_carries_record_id() {
        let ctx = ErrorContext {
            record_id: Some("r-42".to_string()),
            ..Default::default()
        };
        let err = provider().map_error(RawApiError::with_code("RecordNotFound", "gone"), ctx);
        assert!(
            matches!(err, ProviderError::RecordNotFound { ref record_id, .. } if record_id == "r-42"),
            "expected RecordNotFound, got {err:?}"
        );
    }

    #[test]
    fn zone_not_found_carries_zone() {
        let err = provider().map_error(
            RawApiError::with_code("ZoneNotFound", "no zone"),
            ErrorContext::zone(7),
        );
        assert!(
            matches!(err, ProviderError::ZoneNotFound { ref zone, .. } if zone == "7"),
            "expected ZoneNotFound, got {err:?}"
        );
    }

    #[test]
    fn record_exists_carries_host() {
        let ctx = ErrorContext {
            record_name: Some("www".to_string()),
            ..Default::default()
        };
        let err = provider().map_error(RawApiError::with_code("RecordAlreadyExists", "dup"), ctx);
        assert!(
            matches!(err, ProviderError::RecordExists { ref record_name, .. } if record_name == "www"),
            "expected RecordExists, got {err:?}"
        );
    }

    // ---- Invalid parameter ----

    #[test]
    fn invalid_parameter_extracts_param_name() {
        let p = provider();
        let err = p.map_error(
            RawApiError::with_code("InvalidParameter.Host", "bad host"),
            default_ctx(),
        );
        assert!(
            matches!(err, ProviderError::InvalidParameter { ref param, .. } if param == "Host"),
            "got {err:?}"
        );

        let err = p.map_error(
            RawApiError::with_code("MissingParameter", "missing"),
            default_ctx(),
        );
        assert!(
            matches!(err, ProviderError::InvalidParameter { ref param, .. } if param == "request"),
            "got {err:?}"
        );
    }

    // ---- Fallback ----

    #[test]
    fn unknown_code_falls_back() {
        let err = provider().map_error(
            RawApiError::with_code("Something.New", "huh"),
            default_ctx(),
        );
        assert!(
            matches!(err, ProviderError::Unknown { raw_code: Some(ref c), .. } if c == "Something.New"),
            "got {err:?}"
        );
    }

    #[test]
    fn missing_code_falls_back() {
        let err = provider().map_error(RawApiError::new("plain"), default_ctx());
        assert!(matches!(err, ProviderError::Unknown { raw_code: None, .. }));
    }
}
