//! Open key/value document describing what the TV display should render.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Loosely-typed display status attached to a round.
///
/// The wire format stays an open map so operator consoles can add keys the
/// backend does not know about. Partial updates are merged with
/// [`DisplayStatus::merge`], never replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct DisplayStatus(IndexMap<String, Value>);

impl DisplayStatus {
    /// Empty display status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow merge: keys present in `patch` overwrite (including explicit
    /// `null`), every other key is retained in place.
    pub fn merge(&mut self, patch: DisplayStatus) {
        for (key, value) in patch.0 {
            self.0.insert(key, value);
        }
    }

    /// Return a merged copy without touching `self`.
    pub fn merged(&self, patch: DisplayStatus) -> Self {
        let mut next = self.clone();
        next.merge(patch);
        next
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or overwrite a single key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Whether no key has ever been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<IndexMap<String, Value>> for DisplayStatus {
    fn from(value: IndexMap<String, Value>) -> Self {
        Self(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DisplayStatus {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
