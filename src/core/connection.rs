use serde::{Deserialize, Serialize};

use super::record::{Record, record_id, str_field};

/// A connection as stored server-side. No fixed schema is enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Connection(pub Record);

impl Connection {
    pub fn server_id(&self) -> Option<&str> {
        record_id(&self.0)
    }

    pub fn display_name(&self) -> Option<&str> {
        str_field(&self.0, "connectionName")
            .or_else(|| str_field(&self.0, "name"))
            .or_else(|| str_field(&self.0, "username"))
    }

    pub fn note(&self) -> Option<&str> {
        str_field(&self.0, "note")
    }

    pub fn email(&self) -> Option<&str> {
        str_field(&self.0, "email")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_precedence() {
        let c: Connection =
            serde_json::from_value(json!({ "name": "Bob", "username": "bob42" })).unwrap();
        assert_eq!(c.display_name(), Some("Bob"));

        let c: Connection = serde_json::from_value(json!({
            "connectionName": "Robert",
            "name": "Bob",
        }))
        .unwrap();
        assert_eq!(c.display_name(), Some("Robert"));

        let c: Connection = serde_json::from_value(json!({ "note": "met at booth" })).unwrap();
        assert_eq!(c.display_name(), None);
        assert_eq!(c.note(), Some("met at booth"));
    }
}
