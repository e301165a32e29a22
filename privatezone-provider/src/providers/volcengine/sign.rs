//! Volcengine HMAC-SHA256 签名

use chrono::{DateTime, Utc};

use crate::providers::common::{hmac_sha256, sha256_hex};

use super::credentials::Credentials;
use super::{PRIVATE_ZONE_SERVICE, PRIVATE_ZONE_VERSION, VolcengineProvider};

/// 参与签名的请求头（按字典序）
pub(crate) const SIGNED_HEADERS: &str = "content-type;host;x-content-sha256;x-date";
pub(crate) const CONTENT_TYPE: &str = "application/json";

/// 签名结果：调用方需要原样放入请求头
#[derive(Debug, Clone)]
pub(crate) struct SignedRequest {
    /// `X-Date`, `YYYYMMDD'T'HHMMSS'Z'`
    pub x_date: String,
    /// `X-Content-Sha256`
    pub content_sha256: String,
    /// `Authorization`
    pub authorization: String,
}

/// 规范化查询串：按 key 排序，RFC 3986 编码
pub(crate) fn canonical_query(action: &str) -> String {
    let mut pairs = [("Action", action), ("Version", PRIVATE_ZONE_VERSION)];
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

impl VolcengineProvider {
    /// 生成 HMAC-SHA256 签名
    pub(crate) fn sign(
        &self,
        credentials: &Credentials,
        action: &str,
        payload: &str,
        now: DateTime<Utc>,
    ) -> SignedRequest {
        let x_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let short_date = now.format("%Y%m%d").to_string();
        let content_sha256 = sha256_hex(payload.as_bytes());

        // 1. 规范请求
        let canonical_headers = format!(
            "content-type:{CONTENT_TYPE}\nhost:{}\nx-content-sha256:{content_sha256}\nx-date:{x_date}\n",
            self.host
        );
        let canonical_request = format!(
            "POST\n/\n{}\n{canonical_headers}\n{SIGNED_HEADERS}\n{content_sha256}",
            canonical_query(action)
        );

        // 2. 待签名字符串
        let algorithm = "HMAC-SHA256";
        let credential_scope = format!(
            "{short_date}/{}/{PRIVATE_ZONE_SERVICE}/request",
            self.region
        );
        let string_to_sign = format!(
            "{algorithm}\n{x_date}\n{credential_scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        // 3. 派生签名密钥
        let k_date = hmac_sha256(credentials.secret_access_key.as_bytes(), short_date.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, PRIVATE_ZONE_SERVICE.as_bytes());
        let k_signing = hmac_sha256(&k_service, b"request");
        let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

        SignedRequest {
            x_date,
            content_sha256,
            authorization: format!(
                "{algorithm} Credential={}/{credential_scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
                credentials.access_key_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::super::VolcengineProvider;
    use super::super::credentials::Credentials;
    use super::canonical_query;

    fn provider() -> VolcengineProvider {
        VolcengineProvider::new("test_ak".to_string(), "test_sk".to_string()).unwrap()
    }

    fn keys(ak: &str, sk: &str) -> Credentials {
        Credentials {
            access_key_id: ak.to_string(),
            secret_access_key: sk.to_string(),
            session_token: None,
        }
    }

    fn test_keys() -> Credentials {
        keys("test_ak", "test_sk")
    }

    fn at(h: u32) -> DateTime<Utc> {
        // 2024-01-15 hh:00:00 UTC
        Utc.with_ymd_and_hms(2024, 1, 15, h, 0, 0).unwrap()
    }

    fn signature_of(auth: &str) -> &str {
        auth.rsplit("Signature=").next().unwrap()
    }

    // ---- 输出格式 ----

    #[test]
    fn sign_output_format() {
        let signed = provider().sign(&test_keys(), "ListRecords", "{}", at(8));

        assert!(
            signed.authorization.starts_with("HMAC-SHA256 Credential=test_ak/"),
            "unexpected authorization: {}",
            signed.authorization
        );
        assert!(
            signed
                .authorization
                .contains("SignedHeaders=content-type;host;x-content-sha256;x-date,"),
            "unexpected authorization: {}",
            signed.authorization
        );
        assert_eq!(signature_of(&signed.authorization).len(), 64);
        assert_eq!(signed.x_date, "20240115T080000Z");
    }

    // ---- Credential scope ----

    #[test]
    fn credential_scope_uses_region_and_service() {
        let signed = provider().sign(&test_keys(), "ListRecords", "{}", at(8));
        assert!(
            signed
                .authorization
                .contains("Credential=test_ak/20240115/cn-beijing/private_zone/request,"),
            "unexpected authorization: {}",
            signed.authorization
        );

        let p = VolcengineProvider::builder("ak".to_string(), "sk".to_string())
            .region("cn-shanghai")
            .build()
            .unwrap();
        let signed = p.sign(&test_keys(), "ListRecords", "{}", at(8));
        assert!(signed.authorization.contains("/cn-shanghai/private_zone/request"));
    }

    // ---- payload hash ----

    #[test]
    fn content_sha256_is_payload_digest() {
        let signed = provider().sign(&test_keys(), "ListRecords", "", at(8));
        assert_eq!(
            signed.content_sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    // ---- 确定性 ----

    #[test]
    fn sign_deterministic() {
        let p = provider();
        let a = p.sign(&test_keys(), "ListRecords", r#"{"ZID":1}"#, at(8));
        let b = p.sign(&test_keys(), "ListRecords", r#"{"ZID":1}"#, at(8));
        assert_eq!(a.authorization, b.authorization);
    }

    #[test]
    fn sign_different_action_changes_signature() {
        let p = provider();
        let a = p.sign(&test_keys(), "ListRecords", "{}", at(8));
        let b = p.sign(&test_keys(), "DeleteRecord", "{}", at(8));
        assert_ne!(signature_of(&a.authorization), signature_of(&b.authorization));
    }

    #[test]
    fn sign_different_payload_changes_signature() {
        let p = provider();
        let a = p.sign(&test_keys(), "ListRecords", r#"{"ZID":1}"#, at(8));
        let b = p.sign(&test_keys(), "ListRecords", r#"{"ZID":2}"#, at(8));
        assert_ne!(signature_of(&a.authorization), signature_of(&b.authorization));
    }

    #[test]
    fn sign_different_secret_changes_signature() {
        let p = provider();
        let a = p.sign(&keys("ak", "key_alpha"), "ListRecords", "{}", at(8));
        let b = p.sign(&keys("ak", "key_beta"), "ListRecords", "{}", at(8));
        assert_ne!(signature_of(&a.authorization), signature_of(&b.authorization));
    }

    #[test]
    fn sign_time_changes_signature_but_not_scope_within_day() {
        let p = provider();
        let morning = p.sign(&test_keys(), "ListRecords", "{}", at(8));
        let evening = p.sign(&test_keys(), "ListRecords", "{}", at(20));
        assert_ne!(
            signature_of(&morning.authorization),
            signature_of(&evening.authorization)
        );
        assert!(evening.authorization.contains("/20240115/"));
    }

    #[test]
    fn canonical_query_sorted() {
        assert_eq!(
            canonical_query("ListPrivateZones"),
            "Action=ListPrivateZones&Version=2022-06-01"
        );
    }
}
