//! Volcengine 凭证
//!
//! Requests are signed either with a static access key pair or with temporary
//! STS credentials obtained by exchanging an OIDC token (`AssumeRoleWithOIDC`).
//! Temporary credentials are cached and refreshed shortly before they expire.

use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper};
use crate::utils::log_sanitizer::mask_secret;

use super::{VolcengineProvider, split_endpoint};

/// Default STS host.
pub(crate) const STS_DEFAULT_ENDPOINT: &str = "sts.volcengineapi.com";
const STS_VERSION: &str = "2018-01-01";
const ASSUME_ROLE_WITH_OIDC: &str = "AssumeRoleWithOIDC";
const DEFAULT_ROLE_SESSION_NAME: &str = "external-dns";
const DEFAULT_DURATION_SECS: u32 = 3600;
/// 过期前多久刷新（秒）
const REFRESH_MARGIN_SECS: i64 = 300;

/// 一组签名凭证
#[derive(Clone)]
pub(crate) struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// STS 临时凭证附带，作为 `X-Security-Token` 发送
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &mask_secret(&self.access_key_id))
            .field("secret_access_key", &mask_secret(&self.secret_access_key))
            .field("session_token", &self.session_token.as_deref().map(mask_secret))
            .finish()
    }
}

/// OIDC role assumption settings.
///
/// The token file is re-read on every exchange, so a projected service account
/// token that is rotated on disk is picked up at the next refresh.
#[derive(Debug, Clone)]
pub struct OidcConfig {
    role_trn: String,
    token_file: PathBuf,
    sts_endpoint: String,
    role_session_name: String,
    duration_secs: u32,
}

impl OidcConfig {
    /// Assume `role_trn` with the OIDC token stored in `token_file`.
    pub fn new(role_trn: impl Into<String>, token_file: impl Into<PathBuf>) -> Self {
        Self {
            role_trn: role_trn.into(),
            token_file: token_file.into(),
            sts_endpoint: STS_DEFAULT_ENDPOINT.to_string(),
            role_session_name: DEFAULT_ROLE_SESSION_NAME.to_string(),
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }

    /// Set the STS endpoint (default: `sts.volcengineapi.com`).
    ///
    /// Accepts a bare host or a full `http(s)://` URL, like the API endpoint.
    pub fn sts_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sts_endpoint = endpoint.into();
        self
    }

    /// Set the role session name (default: `external-dns`).
    pub fn role_session_name(mut self, name: impl Into<String>) -> Self {
        self.role_session_name = name.into();
        self
    }

    /// Set the requested credential lifetime in seconds (default: 3600).
    pub fn duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }
}

/// 凭证来源
pub(crate) enum CredentialSource {
    Static(Credentials),
    Oidc(OidcSource),
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(c) => f.debug_tuple("Static").field(c).finish(),
            Self::Oidc(o) => f
                .debug_struct("Oidc")
                .field("role_trn", &o.config.role_trn)
                .field("token_file", &o.config.token_file)
                .field("sts_endpoint", &format_args!("{}://{}", o.scheme, o.host))
                .finish_non_exhaustive(),
        }
    }
}

pub(crate) struct OidcSource {
    config: OidcConfig,
    scheme: String,
    host: String,
    /// 持锁刷新，避免并发请求重复换取
    cached: Mutex<Option<CachedCredentials>>,
}

impl OidcSource {
    pub fn new(config: OidcConfig) -> Self {
        let (scheme, host) = split_endpoint(&config.sts_endpoint);
        Self {
            config,
            scheme,
            host,
            cached: Mutex::new(None),
        }
    }
}

struct CachedCredentials {
    credentials: Credentials,
    expires_at: DateTime<Utc>,
}

impl CachedCredentials {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

// ============ STS 响应 ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResult {
    credentials: StsCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    /// RFC 3339
    expired_time: String,
}

impl VolcengineProvider {
    /// 当前可用的签名凭证；OIDC 凭证临近过期时先刷新
    pub(crate) async fn credentials(&self) -> Result<Credentials> {
        match &self.credentials {
            CredentialSource::Static(c) => Ok(c.clone()),
            CredentialSource::Oidc(source) => {
                let mut cached = source.cached.lock().await;
                if let Some(c) = cached.as_ref().filter(|c| c.is_fresh(Utc::now())) {
                    return Ok(c.credentials.clone());
                }
                let fresh = self.assume_role_with_oidc(source).await?;
                let credentials = fresh.credentials.clone();
                *cached = Some(fresh);
                Ok(credentials)
            }
        }
    }

    /// 用 OIDC token 换取 STS 临时凭证
    async fn assume_role_with_oidc(&self, source: &OidcSource) -> Result<CachedCredentials> {
        let config = &source.config;
        let token = tokio::fs::read_to_string(&config.token_file)
            .await
            .map_err(|e| ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(format!(
                    "failed to read OIDC token file {}: {e}",
                    config.token_file.display()
                )),
            })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(format!(
                    "OIDC token file {} is empty",
                    config.token_file.display()
                )),
            });
        }

        log::debug!(
            "Exchanging OIDC token for role {} via {}",
            config.role_trn,
            source.host
        );

        let duration = config.duration_secs.to_string();
        let query = [
            ("Action", ASSUME_ROLE_WITH_OIDC),
            ("Version", STS_VERSION),
            ("RoleTrn", config.role_trn.as_str()),
            ("RoleSessionName", config.role_session_name.as_str()),
            ("DurationSeconds", duration.as_str()),
            ("OIDCToken", token),
        ]
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
        let url = format!("{}://{}/?{query}", source.scheme, source.host);

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            self.client.get(&url),
            self.provider_name(),
            ASSUME_ROLE_WITH_OIDC,
            self.max_retries,
        )
        .await?;

        let result = self
            .read_envelope(
                ASSUME_ROLE_WITH_OIDC,
                status,
                &response_text,
                ErrorContext::default(),
            )?
            .ok_or_else(|| self.parse_error("Missing Result in AssumeRoleWithOIDC response"))?;
        let result: AssumeRoleResult =
            serde_json::from_value(result).map_err(|e| self.parse_error(e))?;

        let sts = result.credentials;
        let expires_at = DateTime::parse_from_rfc3339(&sts.expired_time)
            .map_err(|e| self.parse_error(format!("invalid ExpiredTime {}: {e}", sts.expired_time)))?
            .with_timezone(&Utc);

        log::info!(
            "Obtained STS credentials {} for role {}, expiring at {expires_at}",
            mask_secret(&sts.access_key_id),
            config.role_trn
        );

        Ok(CachedCredentials {
            credentials: Credentials {
                access_key_id: sts.access_key_id,
                secret_access_key: sts.secret_access_key,
                session_token: Some(sts.session_token),
            },
            expires_at,
        })
    }
}
