//! Volcengine HTTP 请求方法

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::VolcengineProvider;
use super::sign::{CONTENT_TYPE, canonical_query};
use super::types::VolcResponse;

impl VolcengineProvider {
    /// 执行 OpenAPI 请求并提取 `Result`
    pub(crate) async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        action: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        let result = self.call(action, body, ctx).await?;
        let value = result.ok_or_else(|| self.parse_error("Missing Result in response"))?;
        serde_json::from_value(value).map_err(|e| self.parse_error(e))
    }

    /// 执行不关心返回值的写操作
    pub(crate) async fn request_unit<B: Serialize>(
        &self,
        action: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<()> {
        self.call(action, body, ctx).await.map(|_| ())
    }

    async fn call<B: Serialize>(
        &self,
        action: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<Option<serde_json::Value>> {
        // 1. 序列化请求体
        let payload =
            serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
                provider: self.provider_name().to_string(),
                detail: e.to_string(),
            })?;

        log::debug!("Request Body: {}", truncate_for_log(&payload));

        // 2. 签名
        let credentials = self.credentials().await?;
        let signed = self.sign(&credentials, action, &payload, Utc::now());

        // 3. 发送请求
        let url = format!("{}://{}/?{}", self.scheme, self.host, canonical_query(action));
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Date", &signed.x_date)
            .header("X-Content-Sha256", &signed.content_sha256)
            .header("Authorization", &signed.authorization);
        if let Some(token) = &credentials.session_token {
            request = request.header("X-Security-Token", token);
        }
        let request = request.body(payload);

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            action,
            self.max_retries,
        )
        .await?;

        self.read_envelope(action, status, &response_text, ctx)
    }

    /// 解析响应信封并提取 `Result`；非 2xx 且无法解析时按未知错误处理
    pub(crate) fn read_envelope(
        &self,
        action: &str,
        status: u16,
        response_text: &str,
        ctx: ErrorContext,
    ) -> Result<Option<serde_json::Value>> {
        let envelope: VolcResponse = if (200..300).contains(&status) {
            HttpUtils::parse_json(response_text, self.provider_name())?
        } else if let Ok(envelope) = serde_json::from_str(response_text) {
            envelope
        } else {
            return Err(self.unknown_error(RawApiError::new(format!(
                "HTTP {status}: {}",
                truncate_for_log(response_text)
            ))));
        };

        // 软错误
        if let Some(error) = envelope.response_metadata.error {
            log::warn!(
                "[{}] {action} failed (request {}): {:?} - {}",
                self.provider_name(),
                envelope
                    .response_metadata
                    .request_id
                    .as_deref()
                    .unwrap_or("-"),
                error.code,
                error.message
            );
            let raw = match error.code {
                Some(code) => RawApiError::with_code(code, error.message),
                None => RawApiError::new(error.message),
            };
            return Err(self.map_error(raw, ctx));
        }

        if !(200..300).contains(&status) {
            return Err(self.unknown_error(RawApiError::new(format!(
                "HTTP {status}: {}",
                truncate_for_log(response_text)
            ))));
        }

        Ok(envelope.result)
    }
}
