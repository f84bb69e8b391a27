//! Timestamp filter for local items
//!
//! Selects local items whose best-available timestamp is on/after a cutoff
//! instant. The candidate field list is configuration, tried in priority
//! order; the first present, non-empty field wins. Items with no parseable
//! timestamp are excluded whenever a cutoff is active - never a fatal
//! condition.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::models::Item;

/// Timestamp-like fields tried in priority order when none are configured.
pub const DEFAULT_TIMESTAMP_FIELDS: [&str; 12] = [
    "updated_at",
    "modified",
    "last_modified",
    "lastUpdate",
    "last_updated",
    "mtime",
    "modified_at",
    "date_modified",
    "changed_at",
    "created",
    "created_at",
    "listed_at",
];

/// Default candidate field list as owned strings (config default)
pub fn default_timestamp_fields() -> Vec<String> {
    DEFAULT_TIMESTAMP_FIELDS
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

/// Textual formats accepted for item timestamps, tried in order.
const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a textual timestamp into a UTC instant.
///
/// Accepts ISO 8601 dates/datetimes (with or without offset) and the
/// common localized `MM/DD/YYYY` form. Naive values are treated as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            let dt = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    None
}

/// Resolve the best-available timestamp of an item.
///
/// Tries each candidate field in priority order; numeric values are read
/// as epoch seconds, strings go through `parse_timestamp`.
pub fn item_timestamp(item: &Item, fields: &[String]) -> Option<DateTime<Utc>> {
    for name in fields {
        match item.field(name) {
            Some(Value::Number(n)) => {
                if let Some(ts) = n.as_f64().and_then(epoch_to_instant) {
                    return Some(ts);
                }
            }
            Some(Value::String(s)) => {
                if let Some(ts) = parse_timestamp(s) {
                    return Some(ts);
                }
            }
            _ => {}
        }
    }
    None
}

fn epoch_to_instant(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(whole, nanos)
}

/// Filter items to those whose timestamp is on/after the cutoff.
///
/// Without a cutoff the input is returned unchanged. With a cutoff,
/// items with no parseable timestamp are excluded.
pub fn filter_since(
    items: Vec<Item>,
    cutoff: Option<DateTime<Utc>>,
    fields: &[String],
) -> Vec<Item> {
    let Some(cutoff) = cutoff else {
        return items;
    };

    let before = items.len();
    let filtered: Vec<Item> = items
        .into_iter()
        .filter(|item| item_timestamp(item, fields).is_some_and(|ts| ts >= cutoff))
        .collect();
    tracing::info!(
        cutoff = %cutoff,
        before,
        after = filtered.len(),
        "filtered local items by cutoff"
    );
    filtered
}
