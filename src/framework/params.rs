//! Query-string building.
//!
//! Filters are plain `Serialize` structs. [`Query::from_filters`] flattens them into
//! key/value pairs, dropping every `None` so unset filters never reach the server.

use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::framework::ApiError;

/// Ordered query pairs sent with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Adds the pair only when a value is present.
    pub fn push_opt<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    /// Flattens a filter struct (or map) into query pairs.
    ///
    /// Null fields are skipped, scalars are stringified and sequences repeat the key.
    /// Nested objects are rejected since the backend has no encoding for them.
    pub fn from_filters<F: Serialize + ?Sized>(filters: &F) -> Result<Self, ApiError> {
        let value = serde_json::to_value(filters).map_err(|e| ApiError::Encode(e.to_string()))?;
        let map = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(map) => map,
            other => {
                return Err(ApiError::Encode(format!(
                    "filters must be a struct or map, got {other}"
                )))
            }
        };

        let mut query = Self::new();
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::Array(values) => {
                    for v in values {
                        if let Some(text) = scalar_text(&key, v)? {
                            query.pairs.push((key.clone(), text));
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_text(&key, other)? {
                        query.pairs.push((key, text));
                    }
                }
            }
        }
        Ok(query)
    }

    /// Appends all pairs from `other`.
    pub fn merge(mut self, other: Query) -> Self {
        self.pairs.extend(other.pairs);
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn scalar_text(key: &str, value: Value) -> Result<Option<String>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(ApiError::Encode(format!(
            "filter `{key}` is nested and cannot be sent as a query parameter"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Filters {
        a: Option<String>,
        b: Option<String>,
    }

    #[test]
    fn test_unset_filters_are_omitted() {
        let query = Query::from_filters(&Filters {
            a: None,
            b: Some("x".into()),
        })
        .unwrap();

        assert!(!query.contains("a"));
        assert_eq!(query.get("b"), Some("x"));
        assert_eq!(query.pairs().len(), 1);
    }

    #[test]
    fn test_scalars_and_sequences() {
        #[derive(Serialize)]
        struct Mixed {
            location_id: Option<i64>,
            include_zero: bool,
            status: Vec<&'static str>,
        }
        let query = Query::from_filters(&Mixed {
            location_id: Some(3),
            include_zero: false,
            status: vec!["DRAFT", "SENT"],
        })
        .unwrap();

        assert_eq!(query.get("location_id"), Some("3"));
        assert_eq!(query.get("include_zero"), Some("false"));
        let statuses: Vec<_> = query
            .pairs()
            .iter()
            .filter(|(k, _)| k == "status")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(statuses, vec!["DRAFT", "SENT"]);
    }

    #[test]
    fn test_unit_filters_are_empty() {
        assert!(Query::from_filters(&()).unwrap().is_empty());
    }

    #[test]
    fn test_nested_filters_are_rejected() {
        let mut outer = BTreeMap::new();
        outer.insert("range", BTreeMap::from([("from", 1)]));
        assert!(matches!(Query::from_filters(&outer), Err(ApiError::Encode(_))));
    }

    #[test]
    fn test_builder_helpers() {
        let query = Query::new()
            .push("status", "SENT")
            .push_opt("email_to", None::<String>)
            .push_opt("limit", Some(5));
        assert_eq!(query.get("status"), Some("SENT"));
        assert!(!query.contains("email_to"));
        assert_eq!(query.get("limit"), Some("5"));
    }
}
