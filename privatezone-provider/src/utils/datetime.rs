//! 时间戳序列化/反序列化
//!
//! Volcengine 的列表接口返回 RFC3339 字符串，部分旧接口返回 Unix 时间戳：
//! - 序列化: `DateTime`<Utc> -> RFC3339 字符串
//! - 反序列化: RFC3339 字符串 / Unix 时间戳（秒或毫秒）/ 空字符串 -> `DateTime`<Utc>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// 序列化 Option<`DateTime`<Utc>> 为 Option<RFC3339 字符串>
#[allow(clippy::ref_option)]
pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

/// 反序列化：无法识别的时间格式视为缺失，而不是让整页记录解析失败
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        String(String),
        I64(i64),
    }

    Ok(match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(RawTimestamp::I64(ts)) => parse_unix_timestamp(ts),
        None => None,
    })
}

/// 解析 Unix 时间戳（> 10^11 视为毫秒）
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}
