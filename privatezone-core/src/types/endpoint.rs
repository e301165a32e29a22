//! external-dns endpoint model

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Provider-specific key/value attached to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    pub name: String,
    pub value: String,
}

/// One DNS name + record type + target set + TTL, as exchanged with external-dns.
///
/// `record_ttl == 0` means "unset, use the remote default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub dns_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<String>,
    pub record_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub set_identifier: String,
    #[serde(rename = "recordTTL", default, skip_serializing_if = "is_zero")]
    pub record_ttl: i64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

impl Endpoint {
    pub fn new(
        dns_name: impl Into<String>,
        record_type: impl Into<String>,
        record_ttl: i64,
        targets: Vec<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            targets,
            record_type: record_type.into(),
            record_ttl,
            ..Default::default()
        }
    }

    /// TTL to send to the remote store; unset or negative TTLs leave the remote default.
    pub fn ttl_seconds(&self) -> Option<u32> {
        if self.record_ttl <= 0 {
            None
        } else {
            Some(u32::try_from(self.record_ttl).unwrap_or(u32::MAX))
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// external-dns 会把空切片编码为 `null`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
