//! Property bag values
//!
//! The dynamically typed value exchanged with the provider host. Bags are
//! msgpack on the wire; in memory they are an untagged enum so the same
//! shape round-trips through serde regardless of target language.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use perimeter_common::{Error, Result};

/// Dynamic value that can be encoded to and decoded from a provider
/// property bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Human-readable name of the value's shape, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "object",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// Encode a property bag to msgpack bytes
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    rmp_serde::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a property bag from msgpack bytes. Empty input is a null bag.
pub fn decode(data: &[u8]) -> Result<Value> {
    if data.is_empty() {
        return Ok(Value::Null);
    }

    rmp_serde::from_slice(data).map_err(|e| Error::Serialization(e.to_string()))
}

/// Create a string Value
pub fn string_value(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

/// Create a number Value from i64
pub fn int_value(n: i64) -> Value {
    Value::Number(serde_json::Number::from(n))
}

/// Create a bool Value
pub fn bool_value(b: bool) -> Value {
    Value::Bool(b)
}

/// Create a list Value
pub fn list_value(items: Vec<Value>) -> Value {
    Value::List(items)
}

/// Create a list Value out of strings
pub fn string_list_value<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Value {
    Value::List(items.into_iter().map(|s| string_value(s)).collect())
}

/// Create a bag with the given attributes
pub fn bag(attrs: Vec<(&str, Value)>) -> Value {
    let mut map = BTreeMap::new();
    for (key, value) in attrs {
        map.insert(key.to_string(), value);
    }
    Value::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_bag_round_trips_through_msgpack() {
        let original = bag(vec![
            ("name", string_value("net-1")),
            ("active", bool_value(true)),
            ("mtu", int_value(1500)),
            ("location", Value::Null),
        ]);

        let bytes = encode(&original).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn nested_bag_round_trips_through_msgpack() {
        let original = bag(vec![(
            "protocols",
            bag(vec![
                ("allowIcmp", bool_value(true)),
                (
                    "tcp",
                    bag(vec![
                        ("policy", string_value("RESTRICTED")),
                        ("ports", string_list_value(["443", "8080"])),
                    ]),
                ),
            ]),
        )]);

        let bytes = encode(&original).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn empty_input_decodes_to_null() {
        assert_eq!(decode(&[]).unwrap(), Value::Null);
    }

    #[test]
    fn accessors_reject_wrong_shapes() {
        let value = string_value("hello");
        assert_eq!(value.as_str(), Some("hello"));
        assert_eq!(value.as_i64(), None);
        assert_eq!(value.as_bool(), None);
        assert!(value.get("key").is_none());
        assert_eq!(value.type_name(), "string");
    }
}
