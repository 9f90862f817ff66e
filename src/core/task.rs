use serde::{Deserialize, Serialize};

use super::record::null_as_default;

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum TaskType {
    Connect,
    Meeting,
    Application,
    #[default]
    Other,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::Meeting => "Meeting",
            Self::Application => "Application",
            Self::Other => "Other",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "Connect" => Some(Self::Connect),
            "Meeting" => Some(Self::Meeting),
            "Application" => Some(Self::Application),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Unknown or missing types read as `Other`.
impl From<Option<String>> for TaskType {
    fn from(s: Option<String>) -> Self {
        s.as_deref().and_then(Self::from_name).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: String,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(rename = "eventId", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl TaskRecord {
    pub fn server_id(&self) -> Option<&str> {
        self.object_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_deref().filter(|s| !s.is_empty()))
    }

    /// Only the literal `"completed"` counts as done.
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(STATUS_COMPLETED)
    }

    pub fn belongs_to(&self, event_id: &str) -> bool {
        self.event_id.as_deref() == Some(event_id)
    }
}
