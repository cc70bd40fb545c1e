//! Ordered layer stack and the merge that resolves it.
//!
//! Responsibilities:
//! - Keep producers in priority order: the first one added outranks every later one.
//! - Resolve all producers into a single tree on demand.
//!
//! Does NOT handle:
//! - Building producers from files, URLs, or profiles (see `builder.rs`, `profiles.rs`).
//! - Caching. Every `resolve()` re-runs every producer.
//!
//! Invariants:
//! - Each `add` becomes the new lowest-priority layer.
//! - Absent layers are skipped; they neither override nor get overridden.
//! - A failing producer aborts resolution; partial merges are never returned.

use std::collections::VecDeque;
use std::fmt;

use super::layer::{LayerProducer, SharedProducer};
use crate::error::ConfigError;
use crate::tree::ConfigTree;

/// An ordered collection of configuration layers, highest priority first.
#[derive(Clone, Default)]
pub struct LayerStack {
    /// Sorted from lowest to highest priority.
    layers: VecDeque<SharedProducer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a producer below every layer added so far.
    pub fn add(&mut self, producer: SharedProducer) -> &mut Self {
        self.layers.push_front(producer);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Merge all layers into a single tree.
    ///
    /// Layers are evaluated from lowest to highest priority; each present
    /// result is merged on top of everything evaluated before it.
    pub fn resolve(&self) -> Result<ConfigTree, ConfigError> {
        let mut config = ConfigTree::empty();
        let mut skipped = 0usize;

        for (position, layer) in self.layers.iter().enumerate() {
            match layer.produce()? {
                Some(layer_config) => {
                    tracing::trace!(position, keys = layer_config.root().len(), "Merging layer");
                    config = layer_config.with_fallback(config);
                }
                None => {
                    tracing::trace!(position, "Skipping absent layer");
                    skipped += 1;
                }
            }
        }

        tracing::debug!(layers = self.layers.len(), skipped, "Resolved layer stack");
        Ok(config)
    }
}

impl LayerProducer for LayerStack {
    fn produce(&self) -> Result<Option<ConfigTree>, ConfigError> {
        self.resolve().map(Some)
    }
}

impl fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerStack")
            .field("layers", &self.layers.len())
            .finish()
    }
}
