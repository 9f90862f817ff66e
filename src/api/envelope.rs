use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, RequestError};
use crate::core::connection::Connection;
use crate::core::event::EventRecord;
use crate::core::record::null_as_default;
use crate::core::task::TaskRecord;
use crate::core::user::User;

/// The `{ success, error?, ...payload }` wrapper every endpoint returns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<P> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: P,
}

impl<P: Default> Envelope<P> {
    pub fn ok(payload: P) -> Self {
        Self { success: true, error: None, payload }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), payload: P::default() }
    }
}

impl<P: DeserializeOwned + Default> Envelope<P> {
    /// Decode a parsed response body. A null or non-object body (including one
    /// that failed to parse) becomes an unsuccessful envelope.
    pub fn from_body(body: Value) -> Result<Self, RequestError> {
        if !body.is_object() {
            return Ok(Self { success: false, error: None, payload: P::default() });
        }
        serde_json::from_value(body).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

impl<P> Envelope<P> {
    /// Turn a logical failure into an error, using `default` when the server
    /// gave no message.
    pub fn into_result(self, default: &str) -> Result<P, ApiError> {
        if self.success {
            Ok(self.payload)
        } else {
            Err(ApiError::Logical(
                self.error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| default.to_string()),
            ))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoPayload {}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub event: Option<EventRecord>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPayload {
    #[serde(default)]
    pub task: Option<TaskRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TasksPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventTasksPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub event: Option<EventRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConnectionPayload {
    #[serde(default)]
    pub connection: Option<Connection>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConnectionsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Vec<Connection>,
}
