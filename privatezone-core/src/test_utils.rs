//! 测试辅助模块
//!
//! 提供内存版 [`PrivateZoneApi`] mock，记录每一次远端调用。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use privatezone_provider::{
    NewRecord, PaginatedResponse, PaginationParams, PrivateZone, PrivateZoneApi, ProviderError,
    Result, ZoneRecord,
};
use tokio::sync::RwLock;

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListPrivateZones {
        vpc_id: Option<String>,
        page: u32,
    },
    ListRecords {
        zone_id: i64,
        page: u32,
    },
    CreateRecord {
        zone_id: i64,
        record: NewRecord,
    },
    BatchCreateRecords {
        zone_id: i64,
        records: Vec<NewRecord>,
    },
    UpdateRecord {
        zone_id: i64,
        record_id: String,
        record: NewRecord,
    },
    DeleteRecord {
        zone_id: i64,
        record_id: String,
    },
    BatchDeleteRecords {
        zone_id: i64,
        record_ids: Vec<String>,
    },
}

impl ApiCall {
    /// 对应的 trait 方法名
    pub fn method(&self) -> &'static str {
        match self {
            Self::ListPrivateZones { .. } => "list_private_zones",
            Self::ListRecords { .. } => "list_records",
            Self::CreateRecord { .. } => "create_record",
            Self::BatchCreateRecords { .. } => "batch_create_records",
            Self::UpdateRecord { .. } => "update_record",
            Self::DeleteRecord { .. } => "delete_record",
            Self::BatchDeleteRecords { .. } => "batch_delete_records",
        }
    }

    /// Whether the call changes remote state.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::ListPrivateZones { .. } | Self::ListRecords { .. }
        )
    }
}

#[derive(Default)]
struct State {
    /// (绑定的 VPC, zone)
    zones: Vec<(Option<String>, PrivateZone)>,
    records: BTreeMap<i64, Vec<ZoneRecord>>,
    next_id: u64,
    calls: Vec<ApiCall>,
    /// 方法名 -> 注入的错误（持续生效直到清除）
    failures: HashMap<&'static str, ProviderError>,
}

impl State {
    fn next_record_id(&mut self) -> String {
        self.next_id += 1;
        format!("r{}", self.next_id)
    }

    fn check(&self, method: &'static str) -> Result<()> {
        match self.failures.get(method) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn zone_records(&mut self, zone_id: i64) -> Result<&mut Vec<ZoneRecord>> {
        if !self.zones.iter().any(|(_, z)| z.zone_id == zone_id) {
            return Err(ProviderError::ZoneNotFound {
                provider: "mock".to_string(),
                zone: zone_id.to_string(),
                raw_message: None,
            });
        }
        Ok(self.records.entry(zone_id).or_default())
    }

    /// `(host, type, value)` 在 zone 内唯一
    fn insert(&mut self, zone_id: i64, record: &NewRecord) -> Result<String> {
        let id = self.next_record_id();
        let rows = self.zone_records(zone_id)?;
        if rows.iter().any(|r| {
            r.host == record.host && r.record_type == record.record_type && r.value == record.value
        }) {
            return Err(ProviderError::RecordExists {
                provider: "mock".to_string(),
                record_name: record.host.clone(),
                raw_message: None,
            });
        }
        rows.push(ZoneRecord {
            record_id: id.clone(),
            host: record.host.clone(),
            record_type: record.record_type.clone(),
            value: record.value.clone(),
            ttl: record.ttl,
            updated_at: None,
        });
        Ok(id)
    }

    fn remove(&mut self, zone_id: i64, record_id: &str) -> Result<()> {
        let rows = self.zone_records(zone_id)?;
        let before = rows.len();
        rows.retain(|r| r.record_id != record_id);
        if rows.len() == before {
            return Err(ProviderError::RecordNotFound {
                provider: "mock".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            });
        }
        Ok(())
    }
}

/// In-memory private zone store.
#[derive(Default)]
pub struct MockPrivateZoneApi {
    state: RwLock<State>,
}

/// 与真实接口一致的单页上限
const MAX_PAGE_SIZE: u32 = 100;

fn page_of<T: Clone>(items: &[T], params: &PaginationParams) -> PaginatedResponse<T> {
    let params = params.validated(MAX_PAGE_SIZE);
    let start = (params.page.saturating_sub(1) as usize).saturating_mul(params.page_size as usize);
    let page: Vec<T> = items
        .iter()
        .skip(start)
        .take(params.page_size as usize)
        .cloned()
        .collect();
    PaginatedResponse::new(
        page,
        params.page,
        params.page_size,
        u32::try_from(items.len()).unwrap_or(u32::MAX),
    )
}

impl MockPrivateZoneApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// An API soft error, as returned inside an HTTP 200 envelope.
    pub fn soft_error() -> ProviderError {
        ProviderError::Unknown {
            provider: "mock".to_string(),
            raw_code: Some("InternalError.Mock".to_string()),
            raw_message: "injected failure".to_string(),
        }
    }

    pub async fn add_zone(&self, vpc_id: Option<&str>, zone_id: i64, zone_name: &str) {
        self.state.write().await.zones.push((
            vpc_id.map(str::to_string),
            PrivateZone {
                zone_id,
                zone_name: zone_name.to_string(),
                record_count: None,
            },
        ));
    }

    /// Seed a record without recording a call.
    pub async fn add_record(
        &self,
        zone_id: i64,
        host: &str,
        record_type: &str,
        value: &str,
        ttl: Option<u32>,
    ) -> String {
        let mut state = self.state.write().await;
        let id = state.next_record_id();
        state.records.entry(zone_id).or_default().push(ZoneRecord {
            record_id: id.clone(),
            host: host.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
            ttl,
            updated_at: None,
        });
        id
    }

    pub async fn records(&self, zone_id: i64) -> Vec<ZoneRecord> {
        self.state
            .read()
            .await
            .records
            .get(&zone_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn record_ids(&self, zone_id: i64) -> Vec<String> {
        self.records(zone_id)
            .await
            .into_iter()
            .map(|r| r.record_id)
            .collect()
    }

    pub async fn calls(&self) -> Vec<ApiCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn write_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .await
            .into_iter()
            .filter(ApiCall::is_write)
            .collect()
    }

    pub async fn count_calls(&self, method: &str) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| c.method() == method)
            .count()
    }

    pub async fn clear_calls(&self) {
        self.state.write().await.calls.clear();
    }

    /// Make every call of `method` fail with `error` until [`clear_failures`](Self::clear_failures).
    pub async fn fail_on(&self, method: &'static str, error: ProviderError) {
        self.state.write().await.failures.insert(method, error);
    }

    pub async fn clear_failures(&self) {
        self.state.write().await.failures.clear();
    }
}

#[async_trait]
impl PrivateZoneApi for MockPrivateZoneApi {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn list_private_zones(
        &self,
        vpc_id: Option<&str>,
        params: &PaginationParams,
    ) -> Result<PaginatedResponse<PrivateZone>> {
        let mut state = self.state.write().await;
        state.calls.push(ApiCall::ListPrivateZones {
            vpc_id: vpc_id.map(str::to_string),
            page: params.page,
        });
        state.check("list_private_zones")?;

        let zones: Vec<PrivateZone> = state
            .zones
            .iter()
            .filter(|(vpc, _)| vpc_id.is_none() || vpc.as_deref() == vpc_id)
            .map(|(_, z)| z.clone())
            .collect();
        Ok(page_of(&zones, params))
    }

    async fn list_records(
        &self,
        zone_id: i64,
        params: &PaginationParams,
    ) -> Result<PaginatedResponse<ZoneRecord>> {
        let mut state = self.state.write().await;
        state.calls.push(ApiCall::ListRecords {
            zone_id,
            page: params.page,
        });
        state.check("list_records")?;

        let rows = state.zone_records(zone_id)?.clone();
        Ok(page_of(&rows, params))
    }

    async fn create_record(&self, zone_id: i64, record: &NewRecord) -> Result<String> {
        let mut state = self.state.write().await;
        state.calls.push(ApiCall::CreateRecord {
            zone_id,
            record: record.clone(),
        });
        state.check("create_record")?;
        state.insert(zone_id, record)
    }

    async fn batch_create_records(
        &self,
        zone_id: i64,
        records: &[NewRecord],
    ) -> Result<Vec<String>> {
        let mut state = self.state.write().await;
        state.calls.push(ApiCall::BatchCreateRecords {
            zone_id,
            records: records.to_vec(),
        });
        state.check("batch_create_records")?;
        records.iter().map(|r| state.insert(zone_id, r)).collect()
    }

    async fn update_record(
        &self,
        zone_id: i64,
        record_id: &str,
        record: &NewRecord,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(ApiCall::UpdateRecord {
            zone_id,
            record_id: record_id.to_string(),
            record: record.clone(),
        });
        state.check("update_record")?;

        let row = state
            .zone_records(zone_id)?
            .iter_mut()
            .find(|r| r.record_id == record_id)
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "mock".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })?;
        row.host.clone_from(&record.host);
        row.record_type.clone_from(&record.record_type);
        row.value.clone_from(&record.value);
        row.ttl = record.ttl;
        Ok(())
    }

    async fn delete_record(&self, zone_id: i64, record_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(ApiCall::DeleteRecord {
            zone_id,
            record_id: record_id.to_string(),
        });
        state.check("delete_record")?;
        state.remove(zone_id, record_id)
    }

    async fn batch_delete_records(&self, zone_id: i64, record_ids: &[String]) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(ApiCall::BatchDeleteRecords {
            zone_id,
            record_ids: record_ids.to_vec(),
        });
        state.check("batch_delete_records")?;
        for id in record_ids {
            state.remove(zone_id, id)?;
        }
        Ok(())
    }
}
