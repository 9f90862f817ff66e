//! Canonical shapes for lists rendered from heterogeneous payloads.
//!
//! The user record may carry `events`, `tasks` and `connections` either as
//! bare id strings or as embedded objects, and objects may use `_id` or `id`.
//! Everything funnels through [`EntryRef::classify`] so the id precedence
//! (`_id`, then `id`, then a positional placeholder) stays stable across
//! re-renders.

use serde_json::Value;

use crate::core::connection::Connection;
use crate::core::event::EventRecord;
use crate::core::record::{Record, record_id, str_field};
use crate::core::task::TaskRecord;
use crate::core::user::User;

/// One entry of an embedded collection on the user record.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryRef<'a> {
    /// Bare server id.
    Ref(&'a str),
    /// Embedded object. Entries that are neither string nor object are
    /// treated as an empty object so indexes stay aligned.
    Embedded(Option<&'a Record>),
}

impl<'a> EntryRef<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Self::Ref(s.as_str()),
            Value::Object(map) => Self::Embedded(Some(map)),
            _ => Self::Embedded(None),
        }
    }

    pub fn id(&self) -> Option<&'a str> {
        match self {
            Self::Ref(s) => Some(*s).filter(|s| !s.is_empty()),
            Self::Embedded(rec) => (*rec).and_then(record_id),
        }
    }

    pub fn field(&self, key: &str) -> Option<&'a str> {
        match self {
            Self::Ref(_) => None,
            Self::Embedded(rec) => (*rec).and_then(|r| str_field(r, key)),
        }
    }
}

/// Iterate a collection value. Anything other than an array yields nothing.
pub fn entries(value: Option<&Value>) -> impl Iterator<Item = EntryRef<'_>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(EntryRef::classify)
}

/// Which collection a list is built from; decides placeholders and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Event,
    Task,
    Connection,
}

impl EntryKind {
    fn id_prefix(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Task => "task",
            Self::Connection => "connection",
        }
    }

    fn label_prefix(self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::Task => "Task",
            Self::Connection => "Connection",
        }
    }

    fn label_keys(self) -> &'static [&'static str] {
        match self {
            Self::Event => &["name"],
            Self::Task => &["info", "name"],
            Self::Connection => &["connectionName", "name", "username"],
        }
    }

    /// `event-3`. Display-only, never sent to the server.
    pub fn placeholder_id(self, index: usize) -> String {
        format!("{}-{}", self.id_prefix(), index)
    }

    /// `Event 4` for the entry at zero-based `index`.
    pub fn placeholder_label(self, index: usize) -> String {
        format!("{} {}", self.label_prefix(), index + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub id: String,
    pub name: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: String,
    pub label: String,
}

fn summarize_record(index: usize, ev: &EventRecord) -> EventSummary {
    EventSummary {
        id: ev
            .server_id()
            .map(str::to_string)
            .unwrap_or_else(|| EntryKind::Event.placeholder_id(index)),
        name: ev
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| EntryKind::Event.placeholder_label(index)),
        date: ev.date.clone().filter(|d| !d.is_empty()),
    }
}

fn summarize_entry(index: usize, entry: &EntryRef<'_>) -> EventSummary {
    let kind = EntryKind::Event;
    EventSummary {
        id: entry
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| kind.placeholder_id(index)),
        name: entry
            .field("name")
            .map(str::to_string)
            .unwrap_or_else(|| kind.placeholder_label(index)),
        date: entry.field("date").map(str::to_string),
    }
}

/// Events to show for a user. A non-empty dedicated fetch replaces the
/// embedded references entirely; otherwise the user's `events` are used.
pub fn derive_events(user: Option<&User>, fetched: Option<&[EventRecord]>) -> Vec<EventSummary> {
    if let Some(records) = fetched.filter(|r| !r.is_empty()) {
        return records
            .iter()
            .enumerate()
            .map(|(i, ev)| summarize_record(i, ev))
            .collect();
    }
    entries(user.and_then(User::events))
        .enumerate()
        .map(|(i, entry)| summarize_entry(i, &entry))
        .collect()
}

/// `{id, label}` items for a collection value on the user record.
pub fn derive_items(value: Option<&Value>, kind: EntryKind) -> Vec<ListItem> {
    entries(value)
        .enumerate()
        .map(|(i, entry)| ListItem {
            id: entry
                .id()
                .map(str::to_string)
                .unwrap_or_else(|| kind.placeholder_id(i)),
            label: kind
                .label_keys()
                .iter()
                .find_map(|k| entry.field(k))
                .map(str::to_string)
                .unwrap_or_else(|| kind.placeholder_label(i)),
        })
        .collect()
}

pub fn task_items(tasks: &[TaskRecord]) -> Vec<ListItem> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| ListItem {
            id: t
                .server_id()
                .map(str::to_string)
                .unwrap_or_else(|| EntryKind::Task.placeholder_id(i)),
            label: Some(t.info.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| EntryKind::Task.placeholder_label(i)),
        })
        .collect()
}

/// Connection items, preferring a non-empty fetched list over the user's
/// embedded `connections`.
pub fn connection_items(user: Option<&User>, fetched: &[Connection]) -> Vec<ListItem> {
    if fetched.is_empty() {
        return derive_items(user.and_then(User::connections), EntryKind::Connection);
    }
    let kind = EntryKind::Connection;
    fetched
        .iter()
        .enumerate()
        .map(|(i, c)| ListItem {
            id: c
                .server_id()
                .map(str::to_string)
                .unwrap_or_else(|| kind.placeholder_id(i)),
            label: c
                .display_name()
                .map(str::to_string)
                .unwrap_or_else(|| kind.placeholder_label(i)),
        })
        .collect()
}
