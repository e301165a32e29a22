//! Record store client: zone-scoped record CRUD over the remote API

use std::collections::HashSet;
use std::sync::Arc;

use privatezone_provider::{NewRecord, PrivateZoneApi, ZoneRecord};

use crate::error::{CoreError, CoreResult};
use crate::utils::normalize::canonical_value;
use crate::utils::{batch_for_each, query_all};

/// Zone-scoped record operations, composed from the paginated lister and the batch executor.
///
/// Zone IDs are the decimal strings of the zone index; a malformed ID is an
/// [`CoreError::InvalidArgument`]. Remote failures are wrapped with zone or
/// record context.
pub struct RecordStore {
    api: Arc<dyn PrivateZoneApi>,
    page_size: u32,
    batch_size: usize,
}

impl RecordStore {
    #[must_use]
    pub fn new(api: Arc<dyn PrivateZoneApi>, page_size: u32, batch_size: usize) -> Self {
        Self {
            api,
            page_size,
            batch_size,
        }
    }

    /// All records of a zone.
    pub async fn list_records(&self, zone_id: &str) -> CoreResult<Vec<ZoneRecord>> {
        let zid = parse_zone_id(zone_id)?;
        query_all(self.page_size, |params| async move {
            self.api
                .list_records(zid, &params)
                .await
                .map_err(CoreError::zone(zone_id))
        })
        .await
    }

    /// Create a single record.
    pub async fn create_record(&self, zone_id: &str, record: &NewRecord) -> CoreResult<()> {
        let zid = parse_zone_id(zone_id)?;
        let record_id = self
            .api
            .create_record(zid, record)
            .await
            .map_err(CoreError::record(zone_id, &record.host, &record.record_type))?;
        log::info!(
            "Created {} record '{}' -> '{}' in zone {zone_id} (id {record_id})",
            record.record_type,
            record.host,
            record.value
        );
        Ok(())
    }

    /// Create records in chunks of at most `batch_size`; every record carries its own TTL.
    pub async fn batch_create_records(&self, zone_id: &str, records: &[NewRecord]) -> CoreResult<()> {
        let zid = parse_zone_id(zone_id)?;
        let ids = batch_for_each(records, self.batch_size, |chunk| async move {
            self.api
                .batch_create_records(zid, chunk)
                .await
                .map_err(CoreError::zone(zone_id))
        })
        .await?;
        log::info!("Created {} records in zone {zone_id}", ids.len());
        Ok(())
    }

    /// Delete the records of `(host, record_type)` whose value is one of `targets`.
    ///
    /// The remote API deletes by ID, so this lists the zone, filters, and batch
    /// deletes the matching IDs. TXT and CNAME values compare in normalized form,
    /// so raw and wire-form targets both match. No match is a no-op.
    pub async fn delete_records(
        &self,
        zone_id: &str,
        host: &str,
        record_type: &str,
        targets: &[String],
    ) -> CoreResult<()> {
        let wanted: HashSet<String> = targets
            .iter()
            .map(|t| canonical_value(record_type, t))
            .collect();

        let ids: Vec<String> = self
            .list_records(zone_id)
            .await?
            .into_iter()
            .filter(|r| {
                r.host.eq_ignore_ascii_case(host)
                    && r.record_type.eq_ignore_ascii_case(record_type)
                    && wanted.contains(&canonical_value(record_type, &r.value))
            })
            .map(|r| r.record_id)
            .collect();

        if ids.is_empty() {
            log::info!(
                "No {record_type} record '{host}' with targets {targets:?} in zone {zone_id}, nothing to delete"
            );
            return Ok(());
        }

        self.batch_delete_by_id(zone_id, &ids)
            .await
            .map_err(|e| match e {
                CoreError::Zone { zone_id, source } => CoreError::Record {
                    zone_id,
                    host: host.to_string(),
                    record_type: record_type.to_string(),
                    source,
                },
                other => other,
            })?;
        log::info!(
            "Deleted {} {record_type} records '{host}' in zone {zone_id}",
            ids.len()
        );
        Ok(())
    }

    /// Delete records by ID in chunks of at most `batch_size`.
    pub async fn batch_delete_by_id(&self, zone_id: &str, record_ids: &[String]) -> CoreResult<()> {
        let zid = parse_zone_id(zone_id)?;
        batch_for_each(record_ids, self.batch_size, |chunk| async move {
            self.api
                .batch_delete_records(zid, chunk)
                .await
                .map(|()| Vec::<()>::new())
                .map_err(CoreError::zone(zone_id))
        })
        .await
        .map(|_| ())
    }

    /// Delete one record whose ID the caller already resolved.
    pub async fn delete_record_by_id(&self, zone_id: &str, record: &ZoneRecord) -> CoreResult<()> {
        let zid = parse_zone_id(zone_id)?;
        self.api
            .delete_record(zid, &record.record_id)
            .await
            .map_err(CoreError::record(zone_id, &record.host, &record.record_type))?;
        log::info!(
            "Deleted {} record '{}' -> '{}' in zone {zone_id}",
            record.record_type,
            record.host,
            record.value
        );
        Ok(())
    }

    /// Overwrite one record by ID.
    pub async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &NewRecord,
    ) -> CoreResult<()> {
        let zid = parse_zone_id(zone_id)?;
        self.api
            .update_record(zid, record_id, record)
            .await
            .map_err(CoreError::record(zone_id, &record.host, &record.record_type))?;
        log::info!(
            "Updated {} record '{}' (id {record_id}) in zone {zone_id}",
            record.record_type,
            record.host
        );
        Ok(())
    }
}

fn parse_zone_id(zone_id: &str) -> CoreResult<i64> {
    zone_id
        .parse()
        .map_err(|_| CoreError::InvalidArgument(format!("malformed zone ID '{zone_id}'")))
}
