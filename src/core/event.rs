use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::record::lenient_ids;

/// An event as returned by `get-events` / `get-event`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Task ids. The server may embed task objects or send `null`.
    #[serde(default, deserialize_with = "lenient_ids", skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<String>,
}

impl EventRecord {
    /// Server identifier: `_id`, then `id`. Empty strings do not count.
    pub fn server_id(&self) -> Option<&str> {
        self.object_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn starts_at(&self) -> Option<DateTime<FixedOffset>> {
        self.date.as_deref().and_then(parse_timestamp)
    }
}

/// Parse an ISO-8601 timestamp as the backend emits it (`Date#toISOString`).
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s.trim()).ok()
}

/// Short human label for a timestamp, e.g. `Mar 01, 2026 14:30`.
pub fn format_when(s: &str) -> String {
    match parse_timestamp(s) {
        Some(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        None => s.to_string(),
    }
}
