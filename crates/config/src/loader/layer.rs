//! The deferred computation behind every configuration layer.

use std::sync::Arc;

use crate::error::ConfigError;
use crate::tree::ConfigTree;

/// A lazily-evaluated configuration layer.
///
/// `produce` runs on every resolution; results are never cached. Returning
/// `Ok(None)` means the layer is absent and takes no part in the merge.
pub trait LayerProducer: Send + Sync {
    fn produce(&self) -> Result<Option<ConfigTree>, ConfigError>;
}

impl<F> LayerProducer for F
where
    F: Fn() -> Result<Option<ConfigTree>, ConfigError> + Send + Sync,
{
    fn produce(&self) -> Result<Option<ConfigTree>, ConfigError> {
        self()
    }
}

/// Shared handle to a producer, as stored in a stack.
pub type SharedProducer = Arc<dyn LayerProducer>;

/// Lift an eager tree into a producer that hands out a copy on every call.
pub fn constant(tree: ConfigTree) -> SharedProducer {
    Arc::new(move || -> Result<Option<ConfigTree>, ConfigError> { Ok(Some(tree.clone())) })
}
