//! Timestamp formats
//!
//! Clients exchange timestamps as `DD-MM-YYYY hh:mm:ss AM/PM`. The store keeps
//! them as ISO `YYYY-MM-DD HH:MM:SS` text so that `BETWEEN` compares correctly.

use chrono::{NaiveDate, NaiveDateTime};

/// Client-facing format, 12-hour clock with meridiem
pub const BOUNDARY_FORMAT: &str = "%d-%m-%Y %I:%M:%S %p";

/// Storage format for `DATE` columns and date parameters
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STORAGE_DATE_ONLY: &str = "%Y-%m-%d";

/// Parse a client timestamp such as `01-06-2024 10:00:00 AM`
pub fn parse_boundary(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), BOUNDARY_FORMAT).ok()
}

/// Render a timestamp in the client format
pub fn format_boundary(value: &NaiveDateTime) -> String {
    value.format(BOUNDARY_FORMAT).to_string()
}

/// Parse a stored date, with or without a time part
pub fn parse_storage(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, STORAGE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, STORAGE_DATE_ONLY)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Render a timestamp in the storage format
pub fn format_storage(value: &NaiveDateTime) -> String {
    value.format(STORAGE_FORMAT).to_string()
}
