//! Utility modules.

/// Serde helpers for the timestamps returned by list APIs.
pub mod datetime;

/// Log sanitization: body truncation and secret masking.
pub mod log_sanitizer;
