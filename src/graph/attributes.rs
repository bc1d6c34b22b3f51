//! Key/value attribute tables carried by nodes, edges, paths and networks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single attribute value. The set of variants is closed so that
/// equality and serialization stay well defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self { AttrValue::Number(n) }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self { AttrValue::Number(n as f64) }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self { AttrValue::Number(n as f64) }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self { AttrValue::Number(n as f64) }
}

impl From<usize> for AttrValue {
    fn from(n: usize) -> Self { AttrValue::Number(n as f64) }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self { AttrValue::Bool(b) }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self { AttrValue::Text(s.to_string()) }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self { AttrValue::Text(s) }
}

/// An ordered attribute table. Updates are last-write-wins per key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// Numeric lookup; non-numeric values read as absent.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(AttrValue::as_f64)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Merges `other` into this table, overwriting keys present in both.
    pub fn update(&mut self, other: &Attributes) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> + '_ {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
