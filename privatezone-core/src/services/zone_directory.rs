//! Zone directory: zone listing and owning-zone lookup

use std::collections::BTreeMap;
use std::sync::Arc;

use privatezone_provider::{PrivateZone, PrivateZoneApi};

use crate::error::{CoreError, CoreResult};
use crate::utils::query_all;

/// `zone ID → zone name`, rebuilt on every reconciliation pass.
///
/// Keys are the decimal zone IDs, matching the external-dns `ZoneIDName` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneIndex {
    zones: BTreeMap<String, String>,
}

impl ZoneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, zone_id: impl Into<String>, zone_name: impl Into<String>) {
        self.zones.insert(zone_id.into(), zone_name.into());
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn zone_name(&self, zone_id: &str) -> Option<&str> {
        self.zones.get(zone_id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.zones.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Zone owning `fqdn`: the longest zone name equal to it or a suffix of it on a
    /// label boundary. Nested zones (`example.com` and `sub.example.com`) resolve
    /// to the more specific one. `None` means the name is out of scope.
    pub fn find_owning_zone(&self, fqdn: &str) -> Option<(&str, &str)> {
        let name = fqdn.strip_suffix('.').unwrap_or(fqdn).to_ascii_lowercase();

        // (id, 原始 zone 名, 规范化后长度)
        let mut best: Option<(&str, &str, usize)> = None;
        for (id, zone_name) in self.iter() {
            let zone = zone_name
                .strip_suffix('.')
                .unwrap_or(zone_name)
                .to_ascii_lowercase();
            let owns = name == zone
                || name
                    .strip_suffix(zone.as_str())
                    .is_some_and(|rest| rest.ends_with('.'));
            if owns && best.is_none_or(|(_, _, len)| zone.len() > len) {
                best = Some((id, zone_name, zone.len()));
            }
        }
        best.map(|(id, zone_name, _)| (id, zone_name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ZoneIndex {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (id, name) in iter {
            index.insert(id, name);
        }
        index
    }
}

/// 枚举 VPC 绑定的 private zone
pub struct ZoneDirectory {
    api: Arc<dyn PrivateZoneApi>,
    page_size: u32,
}

impl ZoneDirectory {
    #[must_use]
    pub fn new(api: Arc<dyn PrivateZoneApi>, page_size: u32) -> Self {
        Self { api, page_size }
    }

    /// List every zone, optionally only those bound to `vpc_id`.
    pub async fn list_zones(&self, vpc_id: Option<&str>) -> CoreResult<Vec<PrivateZone>> {
        let zones = query_all(self.page_size, |params| async move {
            self.api
                .list_private_zones(vpc_id, &params)
                .await
                .map_err(CoreError::from)
        })
        .await?;

        log::debug!(
            "Listed {} private zones (vpc: {})",
            zones.len(),
            vpc_id.unwrap_or("<any>")
        );
        Ok(zones)
    }

    /// Build the index of zones bound to `vpc_id`, keeping only `allowed` IDs when non-empty.
    pub async fn zone_index(&self, vpc_id: Option<&str>, allowed: &[String]) -> CoreResult<ZoneIndex> {
        let zones = self.list_zones(vpc_id).await?;
        Ok(zones
            .into_iter()
            .map(|z| (z.zone_id.to_string(), z.zone_name))
            .filter(|(id, name)| {
                let keep = allowed.is_empty() || allowed.iter().any(|a| a == id);
                if !keep {
                    log::debug!("Zone {id} ({name}) not in zone ID filter, ignoring");
                }
                keep
            })
            .collect())
    }
}
