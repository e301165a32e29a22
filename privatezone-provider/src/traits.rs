use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{NewRecord, PaginatedResponse, PaginationParams, PrivateZone, ZoneRecord};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时补全 zone / record 信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 记录主机名（用于 `RecordExists`）
    pub record_name: Option<String>,
    /// 记录 ID（用于 `RecordNotFound`）
    pub record_id: Option<String>,
    /// Zone ID（用于 `ZoneNotFound`）
    pub zone: Option<String>,
}

impl ErrorContext {
    pub fn zone(zone_id: i64) -> Self {
        Self {
            zone: Some(zone_id.to_string()),
            ..Default::default()
        }
    }
}

/// 错误映射 Trait（内部使用）
/// 将原始 API 错误码映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Private zone API.
///
/// One method per remote operation. Implementations perform exactly one API call
/// per method (plus transport-level retries); pagination and batching policy live
/// in the caller.
#[async_trait]
pub trait PrivateZoneApi: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// 获取 private zone 列表（单页），可按 VPC 过滤
    async fn list_private_zones(
        &self,
        vpc_id: Option<&str>,
        params: &PaginationParams,
    ) -> Result<PaginatedResponse<PrivateZone>>;

    /// 获取 zone 下的记录列表（单页）
    async fn list_records(
        &self,
        zone_id: i64,
        params: &PaginationParams,
    ) -> Result<PaginatedResponse<ZoneRecord>>;

    /// 创建单条记录，返回记录 ID
    async fn create_record(&self, zone_id: i64, record: &NewRecord) -> Result<String>;

    /// 批量创建记录，返回记录 ID 列表
    ///
    /// 调用方负责控制单批数量。
    async fn batch_create_records(&self, zone_id: i64, records: &[NewRecord])
    -> Result<Vec<String>>;

    /// 按 ID 更新记录
    async fn update_record(&self, zone_id: i64, record_id: &str, record: &NewRecord)
    -> Result<()>;

    /// 按 ID 删除单条记录
    async fn delete_record(&self, zone_id: i64, record_id: &str) -> Result<()>;

    /// 按 ID 批量删除记录
    async fn batch_delete_records(&self, zone_id: i64, record_ids: &[String]) -> Result<()>;
}
