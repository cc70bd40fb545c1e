//! The hierarchical configuration value that layers produce and merge.
//!
//! Responsibilities:
//! - Hold one configuration tree (an object at the root, nested objects,
//!   arrays, and scalar leaves).
//! - Implement the recursive fallback merge used by the layer stack.
//! - Offer path-based read helpers and typed extraction through serde.
//!
//! Does NOT handle:
//! - Parsing any text format (see `sources.rs`).
//! - Ordering layers (see `loader/stack.rs`).
//!
//! Invariants:
//! - The root is always an object.
//! - Merging never concatenates arrays: the higher tree's array wins wholesale.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// An immutable configuration tree with an object at its root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: Map<String, Value>,
}

impl ConfigTree {
    /// A tree with no keys.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, rejecting anything that is not an object.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Self::from_value_with_origin(value, "value")
    }

    pub(crate) fn from_value_with_origin(value: Value, origin: &str) -> Result<Self, ConfigError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            // An empty YAML document deserializes as null.
            Value::Null => Ok(Self::empty()),
            _ => Err(ConfigError::InvalidRoot {
                origin: origin.to_string(),
            }),
        }
    }

    /// Build a nested tree from dotted `path = value` pairs.
    ///
    /// Later pairs win when two paths collide; a scalar sitting where a later
    /// path needs an object is replaced by that object.
    pub fn from_dotted_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Map::new();
        for (path, value) in pairs {
            let segments: Vec<&str> = path.as_ref().split('.').collect();
            insert_path(&mut root, &segments, Value::String(value.into()));
        }
        Self { root }
    }

    /// Return a tree where every key of `self` wins and keys only present in
    /// `low` fall through. Objects present on both sides merge recursively.
    pub fn with_fallback(self, low: ConfigTree) -> ConfigTree {
        Self {
            root: merge_objects(self.root, low.root),
        }
    }

    /// Look up a dot-separated path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// True when the path exists and is not null.
    pub fn has_path(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| !v.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The root object.
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Deserialize the whole tree into `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(self.to_value()).map_err(|e| ConfigError::parse("tree", e))
    }

    /// Deserialize the value at `path` into `T`.
    pub fn extract_at<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let value = self
            .get(path)
            .cloned()
            .ok_or_else(|| ConfigError::parse(path, "path is not present"))?;
        serde_json::from_value(value).map_err(|e| ConfigError::parse(path, e))
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}

impl TryFrom<Value> for ConfigTree {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn merge_objects(mut high: Map<String, Value>, low: Map<String, Value>) -> Map<String, Value> {
    for (key, low_value) in low {
        match high.get_mut(&key) {
            Some(high_value) => {
                let taken = std::mem::take(high_value);
                *high_value = merge_values(taken, low_value);
            }
            None => {
                high.insert(key, low_value);
            }
        }
    }
    high
}

fn merge_values(high: Value, low: Value) -> Value {
    match (high, low) {
        (Value::Object(high_map), Value::Object(low_map)) => {
            Value::Object(merge_objects(high_map, low_map))
        }
        // Arrays, scalars, and explicit nulls on the high side win outright.
        (high, _) => high,
    }
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.insert((*first).to_string(), value);
        return;
    }
    let entry = map
        .entry((*first).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, rest, value);
    }
}
