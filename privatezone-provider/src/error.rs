use serde::{Deserialize, Serialize};

/// Unified error type for every remote call against the private zone API.
///
/// Transport failures and API soft errors (an `Error` object inside an otherwise
/// successful HTTP response) both end up here; callers never see a soft error as
/// success. Each variant carries the `provider` that produced it.
///
/// # Retryable Errors
///
/// - [`NetworkError`](Self::NetworkError)
/// - [`Timeout`](Self::Timeout)
/// - [`RateLimited`](Self::RateLimited)
///
/// The built-in HTTP client retries these with exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (connection refused, TLS failure, 5xx gateway, ...).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The access key / secret key pair was rejected.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// A record with the same host, type and value already exists.
    RecordExists {
        /// Provider that produced the error.
        provider: String,
        /// Host of the conflicting record.
        record_name: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The addressed record ID does not exist.
    RecordNotFound {
        /// Provider that produced the error.
        provider: String,
        /// ID of the record that was not found.
        record_id: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The API rejected a request parameter.
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The account's record or zone quota is exhausted.
    QuotaExceeded {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The API rate limit has been exceeded (HTTP 429 or a throttling error code).
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds, if provided.
        retry_after: Option<u64>,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The addressed private zone does not exist.
    ZoneNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Zone ID that was not found.
        zone: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The credentials are valid but lack permission for the action.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// Failed to parse the API response.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// An error code not mapped to a specific variant.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（参数错误、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::RecordExists { .. }
                | Self::RecordNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::QuotaExceeded { .. }
                | Self::ZoneNotFound { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// 是否为可重试的瞬时错误
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => match raw_message {
                Some(msg) => write!(f, "[{provider}] Invalid credentials: {msg}"),
                None => write!(f, "[{provider}] Invalid credentials"),
            },
            Self::RecordExists {
                provider,
                record_name,
                ..
            } => {
                write!(f, "[{provider}] Record '{record_name}' already exists")
            }
            Self::RecordNotFound {
                provider,
                record_id,
                ..
            } => {
                write!(f, "[{provider}] Record '{record_id}' not found")
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::QuotaExceeded { provider, .. } => {
                write!(f, "[{provider}] Quota exceeded")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => match retry_after {
                Some(secs) => write!(f, "[{provider}] Rate limited (retry after {secs}s)"),
                None => write!(f, "[{provider}] Rate limited"),
            },
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::ZoneNotFound {
                provider,
                zone,
                raw_message,
            } => match raw_message {
                Some(msg) => write!(f, "[{provider}] Zone '{zone}' not found: {msg}"),
                None => write!(f, "[{provider}] Zone '{zone}' not found"),
            },
            Self::PermissionDenied {
                provider,
                raw_message,
            } => match raw_message {
                Some(msg) => write!(f, "[{provider}] Permission denied: {msg}"),
                None => write!(f, "[{provider}] Permission denied"),
            },
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::SerializationError { provider, detail } => {
                write!(f, "[{provider}] Serialization error: {detail}")
            }
            Self::Unknown {
                provider,
                raw_code,
                raw_message,
            } => match raw_code {
                Some(code) => write!(f, "[{provider}] {code}: {raw_message}"),
                None => write!(f, "[{provider}] {raw_message}"),
            },
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
