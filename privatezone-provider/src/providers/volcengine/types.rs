//! Volcengine Private Zone API type definition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Response envelope ============

/// Every OpenAPI response: metadata plus an action-specific `Result`.
#[derive(Debug, Deserialize)]
pub struct VolcResponse {
    #[serde(rename = "ResponseMetadata")]
    pub response_metadata: ResponseMetadata,
    #[serde(rename = "Result", default)]
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMetadata {
    #[serde(rename = "RequestId", default)]
    pub request_id: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<VolcError>,
}

/// 软错误：HTTP 200 也可能携带
#[derive(Debug, Deserialize)]
pub struct VolcError {
    #[serde(rename = "Code", default)]
    pub code: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: String,
}

// ============ Zones ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListPrivateZonesRequest<'a> {
    pub page_number: u32,
    pub page_size: u32,
    #[serde(rename = "VpcID", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListPrivateZonesResult {
    #[serde(default)]
    pub zones: Option<Vec<VolcZone>>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct VolcZone {
    #[serde(rename = "ZID")]
    pub zid: Option<i64>,
    #[serde(rename = "ZoneName")]
    pub zone_name: Option<String>,
    #[serde(rename = "RecordCount", default)]
    pub record_count: Option<u32>,
}

// ============ Records ============

#[derive(Debug, Serialize)]
pub struct ListRecordsRequest {
    #[serde(rename = "ZID")]
    pub zid: i64,
    #[serde(rename = "PageNumber")]
    pub page_number: u32,
    #[serde(rename = "PageSize")]
    pub page_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListRecordsResult {
    #[serde(default)]
    pub records: Option<Vec<VolcRecord>>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// 列表中的记录；字段均可能缺失，缺少关键字段的记录会被跳过
#[derive(Debug, Deserialize)]
pub struct VolcRecord {
    #[serde(rename = "RecordID")]
    pub record_id: Option<String>,
    #[serde(rename = "Host")]
    pub host: Option<String>,
    #[serde(rename = "Type")]
    pub record_type: Option<String>,
    #[serde(rename = "Value")]
    pub value: Option<String>,
    #[serde(rename = "TTL", default)]
    pub ttl: Option<u32>,
    #[serde(
        rename = "UpdatedAt",
        default,
        deserialize_with = "crate::utils::datetime::deserialize"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 单条记录的写入字段
#[derive(Debug, Serialize)]
pub struct RecordFields<'a> {
    #[serde(rename = "Host")]
    pub host: &'a str,
    #[serde(rename = "Type")]
    pub record_type: &'a str,
    #[serde(rename = "Value")]
    pub value: &'a str,
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CreateRecordRequest<'a> {
    #[serde(rename = "ZID")]
    pub zid: i64,
    #[serde(flatten)]
    pub record: RecordFields<'a>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordResult {
    #[serde(rename = "RecordID")]
    pub record_id: String,
}

#[derive(Debug, Serialize)]
pub struct BatchCreateRecordRequest<'a> {
    #[serde(rename = "ZID")]
    pub zid: i64,
    #[serde(rename = "Records")]
    pub records: Vec<RecordFields<'a>>,
}

#[derive(Debug, Deserialize)]
pub struct BatchCreateRecordResult {
    #[serde(rename = "RecordIDs", default)]
    pub record_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateRecordRequest<'a> {
    #[serde(rename = "RecordID")]
    pub record_id: &'a str,
    #[serde(flatten)]
    pub record: RecordFields<'a>,
}

#[derive(Debug, Serialize)]
pub struct DeleteRecordRequest<'a> {
    #[serde(rename = "RecordID")]
    pub record_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct BatchDeleteRecordRequest<'a> {
    #[serde(rename = "ZID")]
    pub zid: i64,
    #[serde(rename = "RecordIDs")]
    pub record_ids: &'a [String],
}
