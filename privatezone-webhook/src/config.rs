//! 配置加载
//!
//! Precedence: command-line flag / `VOLCENGINE_*` environment variable, then the
//! TOML file, then built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use privatezone_core::services::{DEFAULT_BATCH_SIZE, DEFAULT_PAGE_SIZE};
use privatezone_core::{DomainFilter, ReconcilerOptions, UpdateStrategy};
use privatezone_provider::{OidcConfig, VolcengineProvider, mask_secret};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8888;
const DEFAULT_REGION: &str = "cn-beijing";
const DEFAULT_ENDPOINT: &str = "open.volcengineapi.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_RETRIES: u32 = 2;

/// 未指定 `--config` 时依次查找
const DEFAULT_CONFIG_PATHS: &[&str] = &["config.toml", "/etc/privatezone-webhook/config.toml"];

/// external-dns webhook for Volcengine private zones
#[derive(Parser, Debug, Default)]
#[command(name = "privatezone-webhook", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// TOML configuration file
    #[arg(short, long, env = "VOLCENGINE_WEBHOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "VOLCENGINE_WEBHOOK_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "VOLCENGINE_WEBHOOK_PORT")]
    pub port: Option<u16>,

    /// Access key ID
    #[arg(long, env = "VOLCENGINE_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Secret access key
    #[arg(long, env = "VOLCENGINE_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// STS session token for temporary credentials
    #[arg(long, env = "VOLCENGINE_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// OIDC token file exchanged for STS credentials when no access key is set
    #[arg(long, env = "VOLCENGINE_OIDC_TOKEN_FILE")]
    pub oidc_token_file: Option<PathBuf>,

    /// Role assumed with the OIDC token
    #[arg(long, env = "VOLCENGINE_OIDC_ROLE_TRN")]
    pub oidc_role_trn: Option<String>,

    /// STS endpoint host, or a full `http(s)://` URL
    #[arg(long, env = "VOLCENGINE_STS_ENDPOINT")]
    pub sts_endpoint: Option<String>,

    /// VPC whose private zones are managed
    #[arg(long, env = "VOLCENGINE_VPC")]
    pub vpc: Option<String>,

    /// API region
    #[arg(long, env = "VOLCENGINE_REGION")]
    pub region: Option<String>,

    /// API endpoint host, or a full `http(s)://` URL
    #[arg(long, env = "VOLCENGINE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Only manage these zone IDs (comma separated)
    #[arg(long, env = "VOLCENGINE_ZONE_IDS", value_delimiter = ',')]
    pub zone_ids: Vec<String>,

    /// Only manage names under these domains (comma separated)
    #[arg(long, env = "VOLCENGINE_DOMAIN_FILTER", value_delimiter = ',')]
    pub domain_filter: Vec<String>,

    /// Never manage names under these domains (comma separated)
    #[arg(long, env = "VOLCENGINE_EXCLUDE_DOMAINS", value_delimiter = ',')]
    pub exclude_domains: Vec<String>,

    /// Records per list page
    #[arg(long, env = "VOLCENGINE_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Records per batch create/delete call
    #[arg(long, env = "VOLCENGINE_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Transport retries for transient API failures
    #[arg(long, env = "VOLCENGINE_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Deadline for one webhook request, in seconds
    #[arg(long, env = "VOLCENGINE_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Write CNAME targets with a trailing dot
    #[arg(long, env = "VOLCENGINE_FQDN_CNAME_TARGETS")]
    pub fqdn_cname_targets: bool,

    /// How updates are applied: `recreate` or `in_place`
    #[arg(long, env = "VOLCENGINE_UPDATE_STRATEGY")]
    pub update_strategy: Option<String>,

    /// Log filter, e.g. `info` or `privatezone_core=debug`
    #[arg(long, env = "VOLCENGINE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "VOLCENGINE_LOG_JSON")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Serve the external-dns webhook (default)
    #[default]
    Serve,
    /// Print the endpoints currently stored in the VPC's private zones as JSON
    List,
    /// Inspect or edit the records of a single zone
    #[command(subcommand)]
    Record(RecordCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RecordCommand {
    /// Create one record
    Add {
        /// Zone ID
        #[arg(long)]
        zone: i64,
        /// Label relative to the zone, `@` for the apex
        #[arg(long)]
        host: String,
        /// Record type
        #[arg(long = "type", default_value = "A")]
        record_type: String,
        /// Record value
        #[arg(long)]
        value: String,
        /// TTL in seconds; the zone default when omitted
        #[arg(long)]
        ttl: Option<u32>,
    },
    /// Delete the records with this host, type and value
    Delete {
        /// Zone ID
        #[arg(long)]
        zone: i64,
        /// Label relative to the zone, `@` for the apex
        #[arg(long)]
        host: String,
        /// Record type
        #[arg(long = "type", default_value = "A")]
        record_type: String,
        /// Record value; repeat to delete several
        #[arg(long = "value", required = true)]
        values: Vec<String>,
    },
    /// Print every record of a zone as JSON
    List {
        /// Zone ID
        #[arg(long)]
        zone: i64,
    },
}

/// TOML 配置文件，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub oidc_token_file: Option<PathBuf>,
    pub oidc_role_trn: Option<String>,
    pub sts_endpoint: Option<String>,
    pub vpc: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub zone_ids: Vec<String>,
    pub domain_filter: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub page_size: Option<u32>,
    pub batch_size: Option<usize>,
    pub max_retries: Option<u32>,
    pub request_timeout: Option<u64>,
    pub fqdn_cname_targets: Option<bool>,
    pub update_strategy: Option<String>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
}

impl FileConfig {
    /// Parse a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// The explicit file if given (must exist), otherwise the first default path that exists.
    ///
    /// Returns the path actually read, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file()),
        };
        match path {
            Some(path) => Ok((Self::from_path(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}

/// 凭证：AK/SK 优先，其次 OIDC
pub enum ApiCredentials {
    AccessKey {
        access_key: String,
        secret_key: String,
        session_token: Option<String>,
    },
    Oidc {
        role_trn: String,
        token_file: PathBuf,
        /// `None` 使用默认 STS endpoint
        sts_endpoint: Option<String>,
    },
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessKey {
                access_key,
                secret_key,
                session_token,
            } => f
                .debug_struct("AccessKey")
                .field("access_key", &mask_secret(access_key))
                .field("secret_key", &mask_secret(secret_key))
                .field("session_token", &session_token.as_deref().map(mask_secret))
                .finish(),
            Self::Oidc {
                role_trn,
                token_file,
                sts_endpoint,
            } => f
                .debug_struct("Oidc")
                .field("role_trn", role_trn)
                .field("token_file", token_file)
                .field("sts_endpoint", sts_endpoint)
                .finish(),
        }
    }
}

/// Volcengine API 凭证与连接参数
#[derive(Debug)]
pub struct ApiSettings {
    pub credentials: ApiCredentials,
    pub region: String,
    pub endpoint: String,
    pub max_retries: u32,
}

impl ApiSettings {
    /// Build the API client for these settings.
    pub fn build_provider(&self) -> privatezone_provider::Result<VolcengineProvider> {
        let builder = match &self.credentials {
            ApiCredentials::AccessKey {
                access_key,
                secret_key,
                session_token,
            } => VolcengineProvider::builder(access_key.clone(), secret_key.clone())
                .session_token(session_token.clone()),
            ApiCredentials::Oidc {
                role_trn,
                token_file,
                sts_endpoint,
            } => {
                let mut oidc = OidcConfig::new(role_trn.as_str(), token_file.as_path());
                if let Some(endpoint) = sts_endpoint {
                    oidc = oidc.sts_endpoint(endpoint.as_str());
                }
                VolcengineProvider::oidc_builder(oidc)
            }
        };
        builder
            .region(&self.region)
            .endpoint(&self.endpoint)
            .max_retries(self.max_retries)
            .build()
    }
}

/// Effective settings after layering.
#[derive(Debug)]
pub struct Settings {
    pub command: Command,
    pub host: String,
    pub port: u16,
    pub api: ApiSettings,
    pub reconciler: ReconcilerOptions,
    pub request_timeout: Duration,
    pub log_level: String,
    pub log_json: bool,
    /// 实际读取的配置文件
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Load the config file named by `cli` (or a default one) and layer `cli` over it.
    pub fn load(cli: Cli) -> Result<Self> {
        let (file, path) = FileConfig::load(cli.config.as_deref())?;
        let mut settings = Self::resolve(cli, file)?;
        settings.config_path = path;
        Ok(settings)
    }

    /// Merge flags over file values over defaults.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let command = cli.command.unwrap_or_default();
        let credentials = resolve_credentials(
            non_empty(cli.access_key.or(file.access_key)),
            non_empty(cli.secret_key.or(file.secret_key)),
            non_empty(cli.session_token.or(file.session_token)),
            cli.oidc_token_file
                .or(file.oidc_token_file)
                .filter(|p| !p.as_os_str().is_empty()),
            non_empty(cli.oidc_role_trn.or(file.oidc_role_trn)),
            non_empty(cli.sts_endpoint.or(file.sts_endpoint)),
        )?;
        // record 子命令按 zone ID 操作，不需要 VPC
        let vpc = non_empty(cli.vpc.or(file.vpc));
        if vpc.is_none() && !matches!(command, Command::Record(_)) {
            bail!("VPC ID is required (VOLCENGINE_VPC)");
        }

        let update_strategy = match cli.update_strategy.or(file.update_strategy) {
            Some(s) => s.parse::<UpdateStrategy>()?,
            None => UpdateStrategy::default(),
        };
        let page_size = cli.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > VolcengineProvider::MAX_PAGE_SIZE {
            bail!(
                "page size must be between 1 and {}",
                VolcengineProvider::MAX_PAGE_SIZE
            );
        }
        let batch_size = cli.batch_size.or(file.batch_size).unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            bail!("batch size must be greater than 0");
        }
        let timeout = cli
            .request_timeout
            .or(file.request_timeout)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout == 0 {
            bail!("request timeout must be greater than 0");
        }

        let domain_filter = DomainFilter::new(
            prefer(cli.domain_filter, file.domain_filter),
            prefer(cli.exclude_domains, file.exclude_domains),
        );

        Ok(Self {
            command,
            host: cli
                .host
                .or(file.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            api: ApiSettings {
                credentials,
                region: non_empty(cli.region.or(file.region))
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
                endpoint: non_empty(cli.endpoint.or(file.endpoint))
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                max_retries: cli
                    .max_retries
                    .or(file.max_retries)
                    .unwrap_or(DEFAULT_MAX_RETRIES),
            },
            reconciler: ReconcilerOptions {
                vpc_id: vpc,
                page_size,
                batch_size,
                domain_filter,
                zone_ids: prefer(cli.zone_ids, file.zone_ids),
                fqdn_cname_targets: cli.fqdn_cname_targets
                    || file.fqdn_cname_targets.unwrap_or(false),
                update_strategy,
            },
            request_timeout: Duration::from_secs(timeout),
            log_level: cli
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            log_json: cli.log_json || file.log_json.unwrap_or(false),
            config_path: None,
        })
    }
}

fn resolve_credentials(
    access_key: Option<String>,
    secret_key: Option<String>,
    session_token: Option<String>,
    oidc_token_file: Option<PathBuf>,
    oidc_role_trn: Option<String>,
    sts_endpoint: Option<String>,
) -> Result<ApiCredentials> {
    if let (Some(access_key), Some(secret_key)) = (access_key, secret_key) {
        return Ok(ApiCredentials::AccessKey {
            access_key,
            secret_key,
            session_token,
        });
    }
    if let (Some(token_file), Some(role_trn)) = (oidc_token_file, oidc_role_trn) {
        return Ok(ApiCredentials::Oidc {
            role_trn,
            token_file,
            sts_endpoint,
        });
    }
    bail!(
        "credentials are required: VOLCENGINE_ACCESS_KEY and VOLCENGINE_SECRET_KEY, \
         or VOLCENGINE_OIDC_TOKEN_FILE and VOLCENGINE_OIDC_ROLE_TRN"
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// 命令行列表非空时覆盖文件中的列表
fn prefer(cli: Vec<String>, file: Vec<String>) -> Vec<String> {
    let cli: Vec<String> = cli.into_iter().filter(|s| !s.trim().is_empty()).collect();
    if cli.is_empty() { file } else { cli }
}
