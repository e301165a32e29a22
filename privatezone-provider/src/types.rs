use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Pagination ============

/// Pagination parameters for list operations.
///
/// Pages are 1-indexed, matching the Volcengine `PageNumber` convention.
///
/// # Default
///
/// The default is `page = 1, page_size = 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Page number (1-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 100,
        }
    }
}

impl PaginationParams {
    /// Create pagination parameters for the given page.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Clamp pagination values to valid ranges.
    ///
    /// - `page` is clamped to `>= 1`
    /// - `page_size` is clamped to `1..=max_page_size`
    #[must_use]
    pub fn validated(&self, max_page_size: u32) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, max_page_size),
        }
    }
}

/// A paginated response wrapper.
///
/// Returned by all list operations. Contains the current page of items
/// along with the total reported by the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    /// Items in the current page.
    pub items: Vec<T>,
    /// Current page number.
    pub page: u32,
    /// Page size used for this request.
    pub page_size: u32,
    /// Total number of items across all pages.
    pub total_count: u32,
    /// Whether there are more pages after this one.
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Create a new paginated response, automatically computing [`has_more`](Self::has_more).
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_count: u32) -> Self {
        let has_more = u64::from(page) * u64::from(page_size) < u64::from(total_count);
        Self {
            items,
            page,
            page_size,
            total_count,
            has_more,
        }
    }
}

// ============ Zones & Records ============

/// A private zone bound to one or more VPCs.
///
/// Zones are only ever read by this library, never created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateZone {
    /// Remote-assigned zone ID (`ZID`).
    pub zone_id: i64,
    /// DNS suffix of the zone, e.g. `example.com`.
    pub zone_name: String,
    /// Number of records in the zone, if reported.
    pub record_count: Option<u32>,
}

/// A single stored record.
///
/// The remote store is single-valued: a record with several targets is stored as
/// several rows that share `host` and `record_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    /// Remote-assigned record ID, required for update/delete.
    pub record_id: String,
    /// Label relative to the zone, or `@` for the zone apex.
    pub host: String,
    /// Record type (`A`, `CNAME`, `TXT`, ...).
    pub record_type: String,
    /// One target value.
    pub value: String,
    /// TTL in seconds, if set.
    pub ttl: Option<u32>,
    /// Last modification time, if reported.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or updating a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// Label relative to the zone, or `@` for the zone apex.
    pub host: String,
    /// Record type.
    pub record_type: String,
    /// Target value, already in wire form.
    pub value: String,
    /// TTL in seconds; `None` leaves the remote default.
    pub ttl: Option<u32>,
}

impl NewRecord {
    pub fn new(
        host: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
        ttl: Option<u32>,
    ) -> Self {
        Self {
            host: host.into(),
            record_type: record_type.into(),
            value: value.into(),
            ttl,
        }
    }
}
