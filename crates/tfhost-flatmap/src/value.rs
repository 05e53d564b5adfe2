//! Expanded attribute values

use std::collections::BTreeMap;

use serde::Serialize;

/// A value rebuilt from the flat attribute encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Expanded {
    /// `"true"` / `"false"` scalar
    Bool(bool),
    /// Any other scalar, kept verbatim
    String(String),
    /// Ordered list, from `key.#` plus numeric indices
    List(Vec<Expanded>),
    /// Mapping, from `key.%` or bare sub-keys
    Map(BTreeMap<String, Expanded>),
}

impl Expanded {
    /// Coerce a raw scalar the way the encoding does
    #[must_use]
    pub fn scalar(raw: &str) -> Self {
        match raw {
            "true" => Expanded::Bool(true),
            "false" => Expanded::Bool(false),
            other => Expanded::String(other.to_string()),
        }
    }

    /// String content, if this is a string scalar
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expanded::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean scalar
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Expanded::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// List elements, if this is a list
    #[must_use]
    pub fn as_list(&self) -> Option<&[Expanded]> {
        match self {
            Expanded::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map entries, if this is a map
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Expanded>> {
        match self {
            Expanded::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for Expanded {
    fn from(value: &str) -> Self {
        Expanded::String(value.to_string())
    }
}

impl From<bool> for Expanded {
    fn from(value: bool) -> Self {
        Expanded::Bool(value)
    }
}

impl From<Expanded> for serde_json::Value {
    fn from(value: Expanded) -> Self {
        match value {
            Expanded::Bool(b) => serde_json::Value::Bool(b),
            Expanded::String(s) => serde_json::Value::String(s),
            Expanded::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Expanded::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}
