//! Claims bag carried in the JWT payload
//!
//! The payload is a dynamic string-keyed mapping so identity codecs can store
//! whatever fields they need. The keys the session store manages itself
//! (`is_authenticated`, `exp`, `iat`, `jti`) get typed accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const IS_AUTHENTICATED: &str = "is_authenticated";
pub const EXPIRATION: &str = "exp";
pub const ISSUED_AT: &str = "iat";
pub const TOKEN_ID: &str = "jti";

/// A JSON-compatible claim value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ClaimValue>),
    Map(Claims),
}

impl ClaimValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ClaimValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ClaimValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ClaimValue]> {
        match self {
            ClaimValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Claims> {
        match self {
            ClaimValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Int(value)
    }
}

impl From<i32> for ClaimValue {
    fn from(value: i32) -> Self {
        ClaimValue::Int(i64::from(value))
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        ClaimValue::Float(value)
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::String(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::String(value)
    }
}

impl From<Vec<ClaimValue>> for ClaimValue {
    fn from(value: Vec<ClaimValue>) -> Self {
        ClaimValue::List(value)
    }
}

impl From<Claims> for ClaimValue {
    fn from(value: Claims) -> Self {
        ClaimValue::Map(value)
    }
}

/// Ordered mapping from claim name to value
///
/// Ordering is deterministic, so two bags with the same content serialize to
/// the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, ClaimValue>);

impl Claims {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&ClaimValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ClaimValue>,
    ) -> Option<ClaimValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ClaimValue> {
        self.0.remove(key)
    }

    /// Copies every entry of `other` into `self`, overwriting existing keys.
    pub fn merge(&mut self, other: Claims) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ClaimValue)> {
        self.0.iter()
    }

    /// `None` when the flag has never been written.
    pub fn is_authenticated(&self) -> Option<bool> {
        self.get(IS_AUTHENTICATED).and_then(ClaimValue::as_bool)
    }

    pub fn set_authenticated(&mut self, state: bool) {
        self.insert(IS_AUTHENTICATED, state);
    }

    pub fn expiration(&self) -> Option<i64> {
        self.get(EXPIRATION).and_then(ClaimValue::as_i64)
    }

    pub fn set_expiration(&mut self, timestamp: i64) {
        self.insert(EXPIRATION, timestamp);
    }

    pub fn clear_expiration(&mut self) {
        self.remove(EXPIRATION);
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.get(ISSUED_AT).and_then(ClaimValue::as_i64)
    }

    pub fn set_issued_at(&mut self, timestamp: i64) {
        self.insert(ISSUED_AT, timestamp);
    }

    pub fn jti(&self) -> Option<&str> {
        self.get(TOKEN_ID).and_then(ClaimValue::as_str)
    }

    pub fn set_jti(&mut self, jti: String) {
        self.insert(TOKEN_ID, jti);
    }

    pub fn clear_jti(&mut self) {
        self.remove(TOKEN_ID);
    }
}

impl From<BTreeMap<String, ClaimValue>> for Claims {
    fn from(map: BTreeMap<String, ClaimValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<ClaimValue>> FromIterator<(K, V)> for Claims {
    fn from_iter<It: IntoIterator<Item = (K, V)>>(iter: It) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Claims {
    type Item = (String, ClaimValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ClaimValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
