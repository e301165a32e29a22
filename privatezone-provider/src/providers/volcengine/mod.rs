//! Volcengine Private Zone Provider

mod credentials;
mod error;
mod http;
mod provider;
mod sign;
/// Volcengine API-specific request/response types.
pub(crate) mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client;

use credentials::{CredentialSource, Credentials, OidcSource};
pub use credentials::OidcConfig;

/// Default OpenAPI host.
pub(crate) const VOLCENGINE_DEFAULT_ENDPOINT: &str = "open.volcengineapi.com";
/// Default region.
pub(crate) const VOLCENGINE_DEFAULT_REGION: &str = "cn-beijing";
/// Service name used in the signing scope.
pub(crate) const PRIVATE_ZONE_SERVICE: &str = "private_zone";
/// `Version` query parameter of every Private Zone action.
pub(crate) const PRIVATE_ZONE_VERSION: &str = "2022-06-01";
/// Private Zone API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE: u32 = 100;

/// Volcengine Private Zone provider.
///
/// Authenticates with an access key pair via HMAC-SHA256 request signing.
/// An STS session token may be supplied for temporary credentials, or the
/// provider can assume a role with an OIDC token file and refresh the
/// resulting STS credentials on its own (see [`OidcConfig`]).
///
/// # Construction
///
/// ```rust,no_run
/// use privatezone_provider::VolcengineProvider;
///
/// # fn main() -> privatezone_provider::Result<()> {
/// let provider = VolcengineProvider::builder("ak".to_string(), "sk".to_string())
///     .region("cn-shanghai")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct VolcengineProvider {
    pub(crate) client: Client,
    pub(crate) credentials: CredentialSource,
    pub(crate) region: String,
    pub(crate) scheme: String,
    pub(crate) host: String,
    pub(crate) max_retries: u32,
}

/// Builder for [`VolcengineProvider`].
pub struct VolcengineProviderBuilder {
    auth: BuilderAuth,
    region: String,
    endpoint: String,
    max_retries: u32,
}

enum BuilderAuth {
    Static(Credentials),
    Oidc(OidcConfig),
}

impl VolcengineProviderBuilder {
    fn with_auth(auth: BuilderAuth) -> Self {
        Self {
            auth,
            region: VOLCENGINE_DEFAULT_REGION.to_string(),
            endpoint: VOLCENGINE_DEFAULT_ENDPOINT.to_string(),
            max_retries: 2,
        }
    }

    /// Set the region used in the signing scope (default: `cn-beijing`).
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the API endpoint (default: `open.volcengineapi.com`).
    ///
    /// A bare host is reached over HTTPS; an explicit `http://` or `https://`
    /// prefix is honoured as given.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Attach an STS session token, sent as `X-Security-Token`.
    ///
    /// Only applies to static credentials; OIDC credentials carry their own.
    pub fn session_token(mut self, token: Option<String>) -> Self {
        match &mut self.auth {
            BuilderAuth::Static(c) => c.session_token = token.filter(|t| !t.is_empty()),
            BuilderAuth::Oidc(_) => {
                if token.is_some() {
                    log::warn!("Ignoring session token: OIDC credentials are in use");
                }
            }
        }
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the [`VolcengineProvider`] instance.
    pub fn build(self) -> Result<VolcengineProvider> {
        let (scheme, host) = split_endpoint(&self.endpoint);
        let credentials = match self.auth {
            BuilderAuth::Static(c) => CredentialSource::Static(c),
            BuilderAuth::Oidc(config) => CredentialSource::Oidc(OidcSource::new(config)),
        };
        Ok(VolcengineProvider {
            client: create_http_client("volcengine")?,
            credentials,
            region: self.region,
            scheme,
            host,
            max_retries: self.max_retries,
        })
    }
}

impl VolcengineProvider {
    /// Largest page size the list actions accept; larger requests are capped.
    pub const MAX_PAGE_SIZE: u32 = MAX_PAGE_SIZE;

    /// Creates a provider for the default region and endpoint.
    pub fn new(access_key_id: String, secret_access_key: String) -> Result<Self> {
        Self::builder(access_key_id, secret_access_key).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(access_key_id: String, secret_access_key: String) -> VolcengineProviderBuilder {
        VolcengineProviderBuilder::with_auth(BuilderAuth::Static(Credentials {
            access_key_id,
            secret_access_key,
            session_token: None,
        }))
    }

    /// Returns a builder that signs with STS credentials obtained through OIDC
    /// role assumption.
    pub fn oidc_builder(config: OidcConfig) -> VolcengineProviderBuilder {
        VolcengineProviderBuilder::with_auth(BuilderAuth::Oidc(config))
    }
}

impl std::fmt::Debug for VolcengineProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolcengineProvider")
            .field("credentials", &self.credentials)
            .field("region", &self.region)
            .field("endpoint", &format_args!("{}://{}", self.scheme, self.host))
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// 拆分 endpoint 为 (scheme, host)
pub(crate) fn split_endpoint(endpoint: &str) -> (String, String) {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if let Some(host) = endpoint.strip_prefix("https://") {
        ("https".to_string(), host.to_string())
    } else if let Some(host) = endpoint.strip_prefix("http://") {
        ("http".to_string(), host.to_string())
    } else {
        ("https".to_string(), endpoint.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{VolcengineProvider, split_endpoint};

    #[test]
    fn debug_masks_credentials() {
        let p = VolcengineProvider::builder(
            "AKLTabcdefgh12345678".to_string(),
            "very-secret-key-value".to_string(),
        )
        .build()
        .unwrap();
        let debug = format!("{p:?}");
        assert!(!debug.contains("very-secret-key-value"), "{debug}");
        assert!(!debug.contains("AKLTabcdefgh12345678"), "{debug}");
        assert!(debug.contains("https://open.volcengineapi.com"), "{debug}");
    }

    #[test]
    fn debug_shows_oidc_role() {
        let p = VolcengineProvider::oidc_builder(super::OidcConfig::new(
            "trn:iam::2100000000:role/dns",
            "/var/run/secrets/token",
        ))
        .build()
        .unwrap();
        let debug = format!("{p:?}");
        assert!(debug.contains("trn:iam::2100000000:role/dns"), "{debug}");
        assert!(debug.contains("https://sts.volcengineapi.com"), "{debug}");
    }

    #[test]
    fn bare_host_defaults_to_https() {
        assert_eq!(
            split_endpoint("open.volcengineapi.com"),
            ("https".to_string(), "open.volcengineapi.com".to_string())
        );
    }

    #[test]
    fn explicit_scheme_kept() {
        assert_eq!(
            split_endpoint("http://127.0.0.1:8080/"),
            ("http".to_string(), "127.0.0.1:8080".to_string())
        );
        assert_eq!(
            split_endpoint("https://pvz.example.internal"),
            ("https".to_string(), "pvz.example.internal".to_string())
        );
    }
}
