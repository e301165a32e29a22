//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use privatezone_provider::{OidcConfig, VolcengineProvider};
use wiremock::MockServer;

pub const TEST_ROLE_TRN: &str = "trn:iam::2100000000:role/external-dns";

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试记录主机名
pub fn generate_test_host() -> String {
    let now = Utc::now();
    format!(
        "_test-{:x}{:x}",
        now.timestamp(),
        now.timestamp_subsec_nanos()
    )
}

/// 指向 mock server 的 provider；不重试，除非测试显式要求
pub fn mock_provider(server: &MockServer) -> VolcengineProvider {
    mock_provider_with_retries(server, 0)
}

pub fn mock_provider_with_retries(server: &MockServer, retries: u32) -> VolcengineProvider {
    VolcengineProvider::builder("test-ak".to_string(), "test-sk".to_string())
        .endpoint(server.uri())
        .max_retries(retries)
        .build()
        .unwrap()
}

/// 写入临时 OIDC token 文件
pub fn write_token_file(token: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("privatezone-oidc{}.token", generate_test_host()));
    std::fs::write(&path, token).unwrap();
    path
}

/// STS 和 Private Zone 都指向同一个 mock server
pub fn mock_oidc_provider(server: &MockServer, token_file: PathBuf) -> VolcengineProvider {
    VolcengineProvider::oidc_builder(
        OidcConfig::new(TEST_ROLE_TRN, token_file).sts_endpoint(server.uri()),
    )
    .endpoint(server.uri())
    .max_retries(0)
    .build()
    .unwrap()
}

/// `AssumeRoleWithOIDC` 成功响应
pub fn sts_envelope(access_key_id: &str, session_token: &str, expires_at: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "ResponseMetadata": {
            "RequestId": "req-sts",
            "Action": "AssumeRoleWithOIDC",
            "Version": "2018-01-01",
        },
        "Result": {
            "Credentials": {
                "AccessKeyId": access_key_id,
                "SecretAccessKey": "sts-secret",
                "SessionToken": session_token,
                "ExpiredTime": expires_at.to_rfc3339(),
                "CurrentTime": Utc::now().to_rfc3339(),
            },
            "AssumedRoleUser": {
                "Trn": "trn:sts::2100000000:assumed-role/external-dns/external-dns",
            },
        },
    })
}

/// 构造成功响应信封
pub fn ok_envelope(action: &str, result: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "ResponseMetadata": {
            "RequestId": "req-test",
            "Action": action,
            "Version": "2022-06-01",
        },
        "Result": result,
    })
}

/// 构造软错误响应信封
pub fn error_envelope(action: &str, code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "ResponseMetadata": {
            "RequestId": "req-test",
            "Action": action,
            "Version": "2022-06-01",
            "Error": { "Code": code, "Message": message },
        },
    })
}

/// 真实环境测试上下文
pub struct LiveContext {
    pub provider: VolcengineProvider,
    pub vpc_id: String,
    pub zone_id: i64,
}

impl LiveContext {
    pub fn from_env() -> Option<Self> {
        let access_key = env::var("VOLCENGINE_ACCESS_KEY").ok()?;
        let secret_key = env::var("VOLCENGINE_SECRET_KEY").ok()?;
        let vpc_id = env::var("VOLCENGINE_VPC").ok()?;
        let zone_id = env::var("TEST_ZONE_ID").ok()?.parse().ok()?;

        let mut builder = VolcengineProvider::builder(access_key, secret_key);
        if let Ok(region) = env::var("VOLCENGINE_REGION") {
            builder = builder.region(region);
        }
        if let Ok(endpoint) = env::var("VOLCENGINE_ENDPOINT") {
            builder = builder.endpoint(endpoint);
        }
        Some(Self {
            provider: builder.build().ok()?,
            vpc_id,
            zone_id,
        })
    }
}
