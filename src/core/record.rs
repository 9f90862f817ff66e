use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A JSON object as the backend sends it. Records are kept loose because the
/// server mixes `_id` and `id` and omits fields freely.
pub type Record = Map<String, Value>;

/// Read a string field, treating empty strings as absent.
pub fn str_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Resolve a record identifier: `_id`, then `id`.
pub fn record_id(record: &Record) -> Option<&str> {
    str_field(record, "_id").or_else(|| str_field(record, "id"))
}

/// Deserialize a field that the server sometimes sends as `null`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a list of references that may hold bare id strings or
/// embedded objects. Ids are kept in order; entries without one are skipped,
/// as is anything that is not a list.
pub fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(entries) = value else {
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(map) => record_id(map).map(str::to_string),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn underscore_id_wins() {
        let r = record(json!({ "_id": "A", "id": "B" }));
        assert_eq!(record_id(&r), Some("A"));
    }

    #[test]
    fn empty_underscore_id_falls_through() {
        let r = record(json!({ "_id": "", "id": "B" }));
        assert_eq!(record_id(&r), Some("B"));
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "lenient_ids")]
        ids: Vec<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        text: String,
    }

    #[test]
    fn lenient_ids_accepts_mixed_entries() {
        let h: Holder = serde_json::from_value(json!({
            "ids": ["a", { "_id": "b" }, { "id": "c" }, {}, 7, ""],
        }))
        .unwrap();
        assert_eq!(h.ids, ["a", "b", "c"]);
    }

    #[test]
    fn nulls_read_as_empty() {
        let h: Holder = serde_json::from_value(json!({ "ids": null, "text": null })).unwrap();
        assert!(h.ids.is_empty());
        assert_eq!(h.text, "");

        let h: Holder = serde_json::from_value(json!({ "ids": "t1" })).unwrap();
        assert!(h.ids.is_empty());
    }

    #[test]
    fn non_string_id_is_ignored() {
        let r = record(json!({ "_id": 42 }));
        assert_eq!(record_id(&r), None);
    }
}
