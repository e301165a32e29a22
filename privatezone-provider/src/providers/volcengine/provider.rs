//! Volcengine `PrivateZoneApi` trait 实现

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{ErrorContext, PrivateZoneApi};
use crate::types::{NewRecord, PaginatedResponse, PaginationParams, PrivateZone, ZoneRecord};

use super::types::{
    BatchCreateRecordRequest, BatchCreateRecordResult, BatchDeleteRecordRequest,
    CreateRecordRequest, CreateRecordResult, DeleteRecordRequest, ListPrivateZonesRequest,
    ListPrivateZonesResult, ListRecordsRequest, ListRecordsResult, RecordFields,
    UpdateRecordRequest, VolcRecord, VolcZone,
};
use super::{MAX_PAGE_SIZE, VolcengineProvider};

impl VolcengineProvider {
    fn record_fields(record: &NewRecord) -> RecordFields<'_> {
        RecordFields {
            host: &record.host,
            record_type: &record.record_type,
            value: &record.value,
            ttl: record.ttl,
        }
    }

    fn convert_zone(zone: VolcZone) -> Option<PrivateZone> {
        Some(PrivateZone {
            zone_id: zone.zid?,
            zone_name: zone.zone_name?,
            record_count: zone.record_count,
        })
    }

    /// 缺少 ID / Host / Type / Value 的记录无法被引用，直接丢弃
    fn convert_record(record: VolcRecord) -> Option<ZoneRecord> {
        Some(ZoneRecord {
            record_id: record.record_id?,
            host: record.host?,
            record_type: record.record_type?,
            value: record.value?,
            ttl: record.ttl,
            updated_at: record.updated_at,
        })
    }
}

#[async_trait]
impl PrivateZoneApi for VolcengineProvider {
    fn id(&self) -> &'static str {
        "volcengine"
    }

    async fn list_private_zones(
        &self,
        vpc_id: Option<&str>,
        params: &PaginationParams,
    ) -> Result<PaginatedResponse<PrivateZone>> {
        let params = params.validated(MAX_PAGE_SIZE);
        let req = ListPrivateZonesRequest {
            page_number: params.page,
            page_size: params.page_size,
            vpc_id,
        };

        let result: ListPrivateZonesResult = self
            .request("ListPrivateZones", &req, ErrorContext::default())
            .await?;

        let zones: Vec<PrivateZone> = result
            .zones
            .unwrap_or_default()
            .into_iter()
            .filter_map(|z| {
                let converted = Self::convert_zone(z);
                if converted.is_none() {
                    log::warn!("Skipping private zone without ZID or ZoneName");
                }
                converted
            })
            .collect();

        let total = result
            .total
            .unwrap_or_else(|| u32::try_from(zones.len()).unwrap_or(u32::MAX));
        Ok(PaginatedResponse::new(
            zones,
            params.page,
            params.page_size,
            total,
        ))
    }

    async fn list_records(
        &self,
        zone_id: i64,
        params: &PaginationParams,
    ) -> Result<PaginatedResponse<ZoneRecord>> {
        let params = params.validated(MAX_PAGE_SIZE);
        let req = ListRecordsRequest {
            zid: zone_id,
            page_number: params.page,
            page_size: params.page_size,
        };

        let result: ListRecordsResult = self
            .request("ListRecords", &req, ErrorContext::zone(zone_id))
            .await?;

        let records: Vec<ZoneRecord> = result
            .records
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| {
                let converted = Self::convert_record(r);
                if converted.is_none() {
                    log::warn!("Skipping incomplete record in zone {zone_id}");
                }
                converted
            })
            .collect();

        let total = result
            .total
            .unwrap_or_else(|| u32::try_from(records.len()).unwrap_or(u32::MAX));
        Ok(PaginatedResponse::new(
            records,
            params.page,
            params.page_size,
            total,
        ))
    }

    async fn create_record(&self, zone_id: i64, record: &NewRecord) -> Result<String> {
        let req = CreateRecordRequest {
            zid: zone_id,
            record: Self::record_fields(record),
        };
        let ctx = ErrorContext {
            record_name: Some(record.host.clone()),
            ..ErrorContext::zone(zone_id)
        };

        let result: CreateRecordResult = self.request("CreateRecord", &req, ctx).await?;
        Ok(result.record_id)
    }

    async fn batch_create_records(
        &self,
        zone_id: i64,
        records: &[NewRecord],
    ) -> Result<Vec<String>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let req = BatchCreateRecordRequest {
            zid: zone_id,
            records: records.iter().map(Self::record_fields).collect(),
        };
        let ctx = ErrorContext {
            record_name: records.first().map(|r| r.host.clone()),
            ..ErrorContext::zone(zone_id)
        };

        let result: BatchCreateRecordResult =
            self.request("BatchCreateRecord", &req, ctx).await?;
        Ok(result.record_ids)
    }

    async fn update_record(
        &self,
        zone_id: i64,
        record_id: &str,
        record: &NewRecord,
    ) -> Result<()> {
        let req = UpdateRecordRequest {
            record_id,
            record: Self::record_fields(record),
        };
        let ctx = ErrorContext {
            record_name: Some(record.host.clone()),
            record_id: Some(record_id.to_string()),
            ..ErrorContext::zone(zone_id)
        };

        self.request_unit("UpdateRecord", &req, ctx).await
    }

    async fn delete_record(&self, zone_id: i64, record_id: &str) -> Result<()> {
        let req = DeleteRecordRequest { record_id };
        let ctx = ErrorContext {
            record_id: Some(record_id.to_string()),
            ..ErrorContext::zone(zone_id)
        };

        self.request_unit("DeleteRecord", &req, ctx).await
    }

    async fn batch_delete_records(&self, zone_id: i64, record_ids: &[String]) -> Result<()> {
        if record_ids.is_empty() {
            return Ok(());
        }

        let req = BatchDeleteRecordRequest {
            zid: zone_id,
            record_ids,
        };
        let ctx = ErrorContext {
            record_id: record_ids.first().cloned(),
            ..ErrorContext::zone(zone_id)
        };

        self.request_unit("BatchDeleteRecord", &req, ctx).await
    }
}
