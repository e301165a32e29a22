//! HTTP 错误映射

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use privatezone_core::CoreError;
use serde::Serialize;

/// Webhook error, a thin wrapper around [`CoreError`].
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct WebhookError(pub CoreError);

impl std::fmt::Display for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<CoreError> for WebhookError {
    fn from(err: CoreError) -> Self {
        if err.is_expected() {
            log::warn!("Request failed: {err}");
        } else {
            log::error!("Request failed: {err}");
        }
        Self(err)
    }
}

impl ResponseError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            CoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CoreError::Cancelled(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}
