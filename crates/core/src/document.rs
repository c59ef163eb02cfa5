//! Discovery document model.
//!
//! A discovery document arrives as untyped JSON. At this boundary it is
//! converted once into [`Document`], whose values are an explicit [`Value`]
//! enum, so the extractor matches exhaustively instead of probing
//! `serde_json::Value` at every call site.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::error::DocumentError;

/// One value inside a discovery document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    /// Ordered sequence; elements may be of mixed types.
    Seq(Vec<Value>),
    Doc(Document),
    /// Numbers and nulls. Never read by the extractor, kept so that a
    /// present-but-mistyped key is distinguishable from an absent one.
    Other,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Seq(_) => "sequence",
            Value::Doc(_) => "document",
            Value::Other => "other",
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Array(items) => Value::Seq(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Doc(Document::from(map)),
            serde_json::Value::Number(_) | serde_json::Value::Null => Value::Other,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Str(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Str(s) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<Document> for Value {
    fn from(d: Document) -> Self { Value::Doc(d) }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self { Value::Seq(items.into_iter().map(Into::into).collect()) }
}

/// Immutable key/value mapping describing one resource kind.
///
/// Keys are kept sorted; nothing in this crate depends on key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self { Self::default() }

    /// Parse a JSON object into a document. Non-object roots are rejected.
    pub fn from_json(v: &serde_json::Value) -> Result<Self, DocumentError> {
        match v {
            serde_json::Value::Object(map) => Ok(Document::from(map)),
            other => Err(DocumentError::NotAnObject { found: json_type_name(other) }),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, DocumentError> {
        let v: serde_json::Value = serde_json::from_str(s)?;
        Self::from_json(&v)
    }

    pub fn get(&self, key: &str) -> Option<&Value> { self.fields.get(key) }

    pub fn contains_key(&self, key: &str) -> bool { self.fields.contains_key(key) }

    pub fn len(&self) -> usize { self.fields.len() }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.fields.keys().map(String::as_str) }

    /// Builder-style insert, used when assembling documents by hand.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl From<&serde_json::Map<String, serde_json::Value>> for Document {
    fn from(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self { fields: map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect() }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = serde_json::Value::deserialize(d)?;
        Document::from_json(&v).map_err(serde::de::Error::custom)
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
