//! Reconciler: zone records ⇄ external-dns endpoints
//!
//! Stateless between calls: every read and every write re-lists zones from the
//! remote store. Concurrent writes against the same zone are not serialized here.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use privatezone_provider::{NewRecord, PrivateZoneApi, ZoneRecord};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::services::record_store::RecordStore;
use crate::services::zone_directory::{ZoneDirectory, ZoneIndex};
use crate::types::{Changes, DomainFilter, Endpoint};
use crate::utils::normalize::{
    canonical_value, complete_cname, escape_txt, host_for, split_host_and_zone,
};

/// 默认分页大小
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// 默认批量大小
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// How `UpdateOld`/`UpdateNew` pairs are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStrategy {
    /// Delete the old targets, then create the new ones.
    #[default]
    Recreate,
    /// Update TTLs by record ID and touch only the targets that changed.
    InPlace,
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recreate => write!(f, "recreate"),
            Self::InPlace => write!(f, "in_place"),
        }
    }
}

impl FromStr for UpdateStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "recreate" => Ok(Self::Recreate),
            "in_place" => Ok(Self::InPlace),
            other => Err(CoreError::InvalidArgument(format!(
                "unknown update strategy '{other}' (expected recreate or in_place)"
            ))),
        }
    }
}

/// Reconciler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerOptions {
    /// Only zones bound to this VPC; `None` lists every zone of the account.
    pub vpc_id: Option<String>,
    pub page_size: u32,
    pub batch_size: usize,
    pub domain_filter: DomainFilter,
    /// Zone ID allow-list; empty means every zone.
    pub zone_ids: Vec<String>,
    /// Send CNAME targets with a trailing dot.
    pub fqdn_cname_targets: bool,
    pub update_strategy: UpdateStrategy,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            vpc_id: None,
            page_size: DEFAULT_PAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            domain_filter: DomainFilter::default(),
            zone_ids: Vec::new(),
            fqdn_cname_targets: false,
            update_strategy: UpdateStrategy::default(),
        }
    }
}

/// Endpoints of one zone, keyed by zone ID.
type ZoneBatch<'a> = BTreeMap<&'a str, (&'a str, Vec<&'a Endpoint>)>;

/// Reconciliation engine
pub struct Reconciler {
    options: ReconcilerOptions,
    zones: ZoneDirectory,
    store: RecordStore,
}

impl Reconciler {
    /// Create a reconciler over `api`.
    pub fn new(api: Arc<dyn PrivateZoneApi>, options: ReconcilerOptions) -> CoreResult<Self> {
        if options.page_size == 0 {
            return Err(CoreError::InvalidArgument(
                "page size must be greater than 0".to_string(),
            ));
        }
        if options.batch_size == 0 {
            return Err(CoreError::InvalidArgument(
                "batch size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            zones: ZoneDirectory::new(api.clone(), options.page_size),
            store: RecordStore::new(api, options.page_size, options.batch_size),
            options,
        })
    }

    pub fn options(&self) -> &ReconcilerOptions {
        &self.options
    }

    pub fn domain_filter(&self) -> &DomainFilter {
        &self.options.domain_filter
    }

    async fn zone_index(&self) -> CoreResult<ZoneIndex> {
        self.zones
            .zone_index(self.options.vpc_id.as_deref(), &self.options.zone_ids)
            .await
    }

    // ===== Read path =====

    /// Current records of every zone, collapsed into endpoints.
    ///
    /// Records sharing `(type, host)` in a zone become one endpoint whose targets
    /// keep list order and whose TTL is that of the first record.
    pub async fn records(&self) -> CoreResult<Vec<Endpoint>> {
        let index = self.zone_index().await?;
        if index.is_empty() {
            log::info!(
                "No private zones found for vpc {}",
                self.options.vpc_id.as_deref().unwrap_or("<any>")
            );
            return Ok(Vec::new());
        }

        let mut endpoints = Vec::new();
        for (zone_id, zone_name) in index.iter() {
            let records = self.store.list_records(zone_id).await?;
            if records.is_empty() {
                continue;
            }
            log::debug!(
                "Zone {zone_id} ({zone_name}) has {} records",
                records.len()
            );
            endpoints.extend(
                collapse(zone_name, records)
                    .into_iter()
                    .filter(|ep| self.options.domain_filter.matches(&ep.dns_name)),
            );
        }

        log::info!(
            "Read {} endpoints from {} zones",
            endpoints.len(),
            index.len()
        );
        Ok(endpoints)
    }

    // ===== Write path =====

    /// Apply a plan according to the configured [`UpdateStrategy`]; deletes always run first.
    pub async fn apply(&self, changes: Changes) -> CoreResult<()> {
        if changes.is_empty() {
            log::debug!("No changes to apply");
            return Ok(());
        }
        log::info!(
            "Applying changes: {} create, {} update, {} delete (strategy {})",
            changes.create.len(),
            changes.update_new.len(),
            changes.delete.len(),
            self.options.update_strategy
        );

        match self.options.update_strategy {
            UpdateStrategy::Recreate => {
                let (creates, deletes) = changes.into_creates_and_deletes();
                self.apply_changes(&creates, &deletes).await
            }
            UpdateStrategy::InPlace => {
                let index = self.zone_index().await?;
                self.delete_endpoints(&index, &changes.delete).await?;
                self.update_endpoints(&index, &changes.update_new).await?;
                self.create_endpoints(&index, &changes.create).await
            }
        }
    }

    /// Delete then create. The first failure aborts; earlier remote writes stay applied.
    pub async fn apply_changes(&self, creates: &[Endpoint], deletes: &[Endpoint]) -> CoreResult<()> {
        if creates.is_empty() && deletes.is_empty() {
            return Ok(());
        }

        let index = self.zone_index().await?;
        self.delete_endpoints(&index, deletes).await?;
        self.create_endpoints(&index, creates).await
    }

    /// Converge each endpoint's records without recreating unchanged targets.
    pub async fn update_in_place(&self, endpoints: &[Endpoint]) -> CoreResult<()> {
        if endpoints.is_empty() {
            return Ok(());
        }
        let index = self.zone_index().await?;
        self.update_endpoints(&index, endpoints).await
    }

    /// Canonicalize names and drop endpoints outside the domain filter.
    pub fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints
            .into_iter()
            .filter_map(|mut ep| {
                if let Some(name) = ep.dns_name.strip_suffix('.') {
                    ep.dns_name = name.to_string();
                }
                if self.options.domain_filter.matches(&ep.dns_name) {
                    Some(ep)
                } else {
                    log::debug!("Dropping endpoint '{}': rejected by domain filter", ep.dns_name);
                    None
                }
            })
            .collect()
    }

    /// Group endpoints by owning zone; out-of-scope endpoints are logged and skipped.
    fn group_by_zone<'a>(
        &self,
        index: &'a ZoneIndex,
        endpoints: &'a [Endpoint],
        action: &str,
    ) -> ZoneBatch<'a> {
        let mut by_zone: ZoneBatch<'a> = BTreeMap::new();
        for ep in endpoints {
            if !self.options.domain_filter.matches(&ep.dns_name) {
                log::debug!(
                    "Skipping {action} of '{}' type '{}': rejected by domain filter",
                    ep.dns_name,
                    ep.record_type
                );
                continue;
            }
            if let Some((zone_id, zone_name)) = index.find_owning_zone(&ep.dns_name) {
                log::debug!(
                    "Adding {action} of '{}' type '{}' to zone {zone_id} ({zone_name})",
                    ep.dns_name,
                    ep.record_type
                );
                by_zone
                    .entry(zone_id)
                    .or_insert_with(|| (zone_name, Vec::new()))
                    .1
                    .push(ep);
            } else {
                log::info!(
                    "Skipping {action} of '{}' type '{}': no owning zone",
                    ep.dns_name,
                    ep.record_type
                );
            }
        }
        by_zone
    }

    async fn delete_endpoints(&self, index: &ZoneIndex, endpoints: &[Endpoint]) -> CoreResult<()> {
        for (zone_id, (zone_name, eps)) in self.group_by_zone(index, endpoints, "deletion") {
            for ep in eps {
                let Some(host) = host_in_zone(ep, zone_name) else {
                    continue;
                };
                self.store
                    .delete_records(zone_id, &host, &ep.record_type, &ep.targets)
                    .await?;
            }
        }
        Ok(())
    }

    async fn create_endpoints(&self, index: &ZoneIndex, endpoints: &[Endpoint]) -> CoreResult<()> {
        for (zone_id, (zone_name, eps)) in self.group_by_zone(index, endpoints, "creation") {
            let mut records = Vec::new();
            for ep in eps {
                let Some(host) = host_in_zone(ep, zone_name) else {
                    continue;
                };
                // 同一 endpoint 的所有 target 共用 endpoint 的 TTL
                let ttl = ep.ttl_seconds();
                records.extend(ep.targets.iter().map(|target| {
                    NewRecord::new(
                        host.clone(),
                        ep.record_type.clone(),
                        self.wire_value(&ep.record_type, target),
                        ttl,
                    )
                }));
            }
            if records.is_empty() {
                continue;
            }
            self.store.batch_create_records(zone_id, &records).await?;
        }
        Ok(())
    }

    async fn update_endpoints(&self, index: &ZoneIndex, endpoints: &[Endpoint]) -> CoreResult<()> {
        for (zone_id, (zone_name, eps)) in self.group_by_zone(index, endpoints, "update") {
            // 每个 zone 只列一次
            let existing = self.store.list_records(zone_id).await?;
            for ep in eps {
                let Some(host) = host_in_zone(ep, zone_name) else {
                    continue;
                };
                self.update_endpoint(zone_id, &host, ep, &existing).await?;
            }
        }
        Ok(())
    }

    async fn update_endpoint(
        &self,
        zone_id: &str,
        host: &str,
        ep: &Endpoint,
        existing: &[ZoneRecord],
    ) -> CoreResult<()> {
        let desired: Vec<String> = ep
            .targets
            .iter()
            .map(|t| canonical_value(&ep.record_type, t))
            .collect();
        let ttl = ep.ttl_seconds();
        let mut present = HashSet::new();

        let current = existing.iter().filter(|r| {
            r.host.eq_ignore_ascii_case(host) && r.record_type.eq_ignore_ascii_case(&ep.record_type)
        });
        for record in current {
            let value = canonical_value(&record.record_type, &record.value);
            // 不再需要的值与重复行都删除
            if !desired.contains(&value) || present.contains(&value) {
                self.store.delete_record_by_id(zone_id, record).await?;
                continue;
            }
            // TTL 未设置时保留远端值
            if ttl.is_some() && record.ttl != ttl {
                let updated = NewRecord::new(
                    record.host.clone(),
                    record.record_type.clone(),
                    record.value.clone(),
                    ttl,
                );
                self.store
                    .update_record(zone_id, &record.record_id, &updated)
                    .await?;
            }
            present.insert(value);
        }

        for (target, value) in ep.targets.iter().zip(desired) {
            if present.contains(&value) {
                continue;
            }
            let record = NewRecord::new(
                host,
                ep.record_type.clone(),
                self.wire_value(&ep.record_type, target),
                ttl,
            );
            self.store.create_record(zone_id, &record).await?;
            present.insert(value);
        }
        Ok(())
    }

    /// Value as sent to the remote store.
    fn wire_value(&self, record_type: &str, target: &str) -> String {
        if record_type.eq_ignore_ascii_case("TXT") {
            escape_txt(target)
        } else if record_type.eq_ignore_ascii_case("CNAME") && self.options.fqdn_cname_targets {
            complete_cname(target)
        } else {
            target.to_string()
        }
    }
}

/// Host label of `ep` inside `zone_name`, or `None` when it does not belong there.
fn host_in_zone(ep: &Endpoint, zone_name: &str) -> Option<String> {
    let (host, domain) = split_host_and_zone(&ep.dns_name, zone_name);
    if domain.is_empty() {
        log::debug!("'{}' is not inside zone {zone_name}, skipping", ep.dns_name);
        None
    } else {
        Some(host)
    }
}

/// Collapse single-valued records into endpoints, in first-appearance order.
fn collapse(zone_name: &str, records: Vec<ZoneRecord>) -> Vec<Endpoint> {
    let mut endpoints: Vec<Endpoint> = Vec::new();
    let mut slots: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        let value = canonical_value(&record.record_type, &record.value);
        let key = (record.record_type.clone(), record.host.clone());
        if let Some(&slot) = slots.get(&key) {
            endpoints[slot].targets.push(value);
        } else {
            slots.insert(key, endpoints.len());
            endpoints.push(Endpoint::new(
                host_for(&record.host, zone_name),
                record.record_type,
                record.ttl.map_or(0, i64::from),
                vec![value],
            ));
        }
    }
    endpoints
}
