//! Shared HTTP plumbing
//!
//! Sends a prepared `RequestBuilder`, classifies transport failures, and retries
//! transient ones. Signing and envelope parsing stay with the provider, which
//! builds the request itself.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Upper bound for any single backoff sleep.
const MAX_BACKOFF_MS: u64 = 10_000;
/// Upper bound for a server-provided `Retry-After`.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// HTTP helpers
pub struct HttpUtils;

impl HttpUtils {
    /// Send one request and return `(status, body)`.
    ///
    /// HTTP 429 becomes [`ProviderError::RateLimited`] and 502/503/504 become
    /// [`ProviderError::NetworkError`]; any other status is handed back to the
    /// caller, which decides whether the body is an error envelope.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        action: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] POST {action}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{provider_name}] {action} -> HTTP {status_code}");

        // Retry-After must be read before the body consumes the response
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                provider: provider_name.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Gateway error (HTTP {status_code})");
            return Err(ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Deserialize a JSON body, mapping failures to [`ProviderError::ParseError`].
    pub fn parse_json<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{provider_name}] JSON parse failed: {e}");
            log::error!(
                "[{provider_name}] Raw response: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Like [`execute_request`](Self::execute_request), retrying transient failures.
    ///
    /// Only [`ProviderError::is_retryable`] errors are retried, at most `max_retries`
    /// times. Delays double from 100ms up to 10s, or follow `Retry-After` (capped at
    /// 30s) for rate limiting. API errors in the response envelope are never retried
    /// here since they surface after this call returns.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        provider_name: &str,
        action: &str,
        max_retries: u32,
    ) -> Result<(u16, String), ProviderError> {
        if max_retries == 0 {
            return Self::execute_request(request_builder, provider_name, action).await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            // RequestBuilder is single-use
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[{provider_name}] Cannot clone request, disabling retry");
                return Self::execute_request(request_builder, provider_name, action).await;
            };

            match Self::execute_request(req, provider_name, action).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] {} failed (attempt {}/{}), retrying in {:.1}s: {}",
                        provider_name,
                        action,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::NetworkError {
            provider: provider_name.to_string(),
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

/// Delay before the next attempt: `Retry-After` when rate limited, otherwise backoff.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))
    } else {
        backoff_delay(attempt)
    }
}

/// 100ms, 200ms, 400ms, ... capped at 10s
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // 防止 2^attempt 溢出
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}
