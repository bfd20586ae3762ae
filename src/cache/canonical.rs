//! # Canonical Values
//!
//! Order-independent tree used as the hashing input for fingerprints.
//! Maps are `BTreeMap`s, so keys always serialize in codepoint order and two
//! payloads that differ only in field order produce the same string.

use super::errors::CacheResult;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Recursive canonical representation of a cache-relevant payload
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<CanonicalValue>),
    Map(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    /// Build a map value from `(key, value)` pairs; insertion order is irrelevant
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, CanonicalValue)>,
        K: Into<String>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Compact JSON rendering with sorted keys and no insignificant whitespace
    pub fn to_canonical_string(&self) -> CacheResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl Serialize for CanonicalValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
        }
    }
}

impl From<&str> for CanonicalValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for CanonicalValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<CanonicalValue>> for CanonicalValue {
    fn from(items: Vec<CanonicalValue>) -> Self {
        Self::List(items)
    }
}

impl From<serde_json::Value> for CanonicalValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_serialize_sorted() {
        let value = CanonicalValue::object([
            ("zeta", CanonicalValue::from("z")),
            ("alpha", CanonicalValue::from("a")),
            ("mid", CanonicalValue::Bool(true)),
        ]);

        assert_eq!(
            value.to_canonical_string().unwrap(),
            r#"{"alpha":"a","mid":true,"zeta":"z"}"#
        );
    }

    #[test]
    fn test_nested_field_order_is_irrelevant() {
        let a: CanonicalValue = serde_json::from_str::<serde_json::Value>(
            r#"{"b": {"y": 1, "x": [ {"q": null, "p": false} ]}, "a": "text"}"#,
        )
        .unwrap()
        .into();
        let b: CanonicalValue = serde_json::from_str::<serde_json::Value>(
            r#"{"a":"text","b":{"x":[{"p":false,"q":null}],"y":1}}"#,
        )
        .unwrap()
        .into();

        assert_eq!(a, b);
        assert_eq!(
            a.to_canonical_string().unwrap(),
            b.to_canonical_string().unwrap()
        );
    }

    #[test]
    fn test_list_order_is_preserved() {
        let forward = CanonicalValue::from(json!(["one", "two"]));
        let reverse = CanonicalValue::from(json!(["two", "one"]));
        assert_ne!(
            forward.to_canonical_string().unwrap(),
            reverse.to_canonical_string().unwrap()
        );
    }

    #[test]
    fn test_codepoint_key_order() {
        let value = CanonicalValue::object([
            ("é", CanonicalValue::Null),
            ("a", CanonicalValue::Null),
            ("Z", CanonicalValue::Null),
        ]);
        assert_eq!(
            value.to_canonical_string().unwrap(),
            r#"{"Z":null,"a":null,"é":null}"#
        );
    }

    #[test]
    fn test_whitespace_inside_strings_is_kept() {
        let value = CanonicalValue::object([("s", CanonicalValue::from("  two  spaces\n"))]);
        assert_eq!(
            value.to_canonical_string().unwrap(),
            r#"{"s":"  two  spaces\n"}"#
        );
    }

    #[test]
    fn test_accessors() {
        let value = CanonicalValue::from(json!({"mimeType": "image/png"}));
        assert_eq!(
            value.get("mimeType").and_then(CanonicalValue::as_str),
            Some("image/png")
        );
        assert!(value.get("missing").is_none());
        assert!(CanonicalValue::Null.get("x").is_none());
    }
}
