//! The flattened property source.

use std::collections::BTreeMap;

use layered_config::{ConfigError, ConfigTree, factory};
use serde_json::Value;

use crate::visitor::{TreeVisitor, walk_tree};

/// Name given to a property source created by [`PropertySource::load`].
pub const DEFAULT_PROPERTY_SOURCE_NAME: &str = "ConfigPropertySource(application)";

#[derive(Default)]
struct Flattener {
    entries: BTreeMap<String, Value>,
}

impl TreeVisitor for Flattener {
    fn on_list(&mut self, _parent: &str, position: &str, list: &[Value]) {
        self.entries
            .insert(position.to_string(), Value::Array(list.to_vec()));
    }

    fn on_value(&mut self, _parent: &str, position: &str, value: &Value) {
        self.entries.insert(position.to_string(), value.clone());
    }
}

/// Flatten a tree into sorted `path -> value` entries.
///
/// ```
/// use layered_config::ConfigTree;
/// use serde_json::json;
///
/// let tree = ConfigTree::from_value(json!({"bar": {"baz": 123}, "xs": ["a"]})).unwrap();
/// let flat = layered_config_property_source::flatten(&tree);
///
/// assert_eq!(flat.keys().collect::<Vec<_>>(), ["bar.baz", "xs", "xs[0]"]);
/// ```
pub fn flatten(tree: &ConfigTree) -> BTreeMap<String, Value> {
    let mut flattener = Flattener::default();
    walk_tree(tree, &mut flattener);
    flattener.entries
}

/// A named, read-only set of flattened configuration properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySource {
    name: String,
    entries: BTreeMap<String, Value>,
    /// Cached so repeated `property_names` calls do not re-collect.
    keys: Vec<String>,
}

impl PropertySource {
    /// Flatten the factory's fully loaded configuration under the default name.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_named(DEFAULT_PROPERTY_SOURCE_NAME)
    }

    /// Flatten the factory's fully loaded configuration under `name`.
    pub fn load_named(name: impl Into<String>) -> Result<Self, ConfigError> {
        let tree = factory::load()?;
        Ok(Self::of(name, &tree))
    }

    /// Wrap an already loaded tree.
    pub fn of(name: impl Into<String>, tree: &ConfigTree) -> Self {
        let name = name.into();
        let entries = flatten(tree);
        let keys = entries.keys().cloned().collect();
        tracing::debug!(source = %name, properties = entries.len(), "Created property source");
        Self {
            name,
            entries,
            keys,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All property names, sorted.
    pub fn property_names(&self) -> &[String] {
        &self.keys
    }

    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains_property(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }
}
