use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{Record, str_field};

/// The logged-in user as returned by the server. The record is opaque; only a
/// handful of fields are read client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(pub Record);

impl User {
    pub fn username(&self) -> Option<&str> {
        str_field(&self.0, "username")
    }

    pub fn email(&self) -> Option<&str> {
        str_field(&self.0, "email")
    }

    /// Phone numbers come back either as numbers or as strings.
    pub fn phone_number(&self) -> Option<String> {
        match self.0.get("phoneNumber")? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// Raw `events` value, if present. Callers normalize it.
    pub fn events(&self) -> Option<&Value> {
        self.0.get("events")
    }

    pub fn tasks(&self) -> Option<&Value> {
        self.0.get("tasks")
    }

    pub fn connections(&self) -> Option<&Value> {
        self.0.get("connections")
    }

    pub fn integrations(&self) -> Option<&Value> {
        self.0.get("integrations")
    }
}
