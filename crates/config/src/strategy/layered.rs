//! The layered loading strategy and its builder.
//!
//! Responsibilities:
//! - Turn a declared layer stack into a strategy the factory can call.
//! - Install and uninstall that strategy as the process default.
//!
//! Does NOT handle:
//! - Declaring layers (see `loader::LayerSink`).
//!
//! Invariants / Assumptions:
//! - A strategy built from zero layers behaves exactly like `DefaultLoadingStrategy`.
//! - `uninstall` only clears the registration if this instance is the one installed.
//! - Caches are invalidated after every change to the registration, never before.

use std::fmt;
use std::sync::Arc;

use super::default::DefaultLoadingStrategy;
use super::{LoadingStrategy, registry};
use crate::constants::STRATEGY_PROPERTY_NAME;
use crate::error::ConfigError;
use crate::factory;
use crate::loader::{LayerSink, LayerStack, SharedProducer};
use crate::properties::set_property;
use crate::sources::ParseOptions;
use crate::tree::ConfigTree;

/// Resolves a layer stack; parse options do not apply to explicit layers.
struct StackStrategy {
    layers: LayerStack,
}

impl LoadingStrategy for StackStrategy {
    fn parse_application_config(&self, _options: &ParseOptions) -> Result<ConfigTree, ConfigError> {
        self.layers.resolve()
    }
}

/// A loading strategy assembled from configuration layers.
///
/// Build one with [`LayeredLoadingStrategy::builder`] and call
/// [`install`](Self::install) to make the factory use it. Instances created
/// with [`new`](Self::new) delegate to whatever is installed at that moment,
/// which is how the factory instantiates the strategy by name.
#[derive(Clone)]
pub struct LayeredLoadingStrategy {
    inner: Arc<dyn LoadingStrategy>,
    configured: bool,
}

impl LayeredLoadingStrategy {
    /// Name under which the factory knows this strategy.
    pub const NAME: &'static str = "layered";

    /// Delegate to the installed layered strategy, or to the platform default
    /// if none is installed.
    pub fn new() -> Self {
        registry::installed().unwrap_or_else(Self::unconfigured)
    }

    pub fn builder() -> LayeredStrategyBuilder {
        LayeredStrategyBuilder::new()
    }

    fn unconfigured() -> Self {
        Self {
            inner: Arc::new(DefaultLoadingStrategy),
            configured: false,
        }
    }

    pub(super) fn inner(&self) -> &Arc<dyn LoadingStrategy> {
        &self.inner
    }

    fn from_layers(layers: LayerStack) -> Self {
        Self {
            inner: Arc::new(StackStrategy { layers }),
            configured: true,
        }
    }

    /// Whether this instance resolves explicit layers rather than the platform default.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Resolve the application config with default parse options.
    pub fn parse_application_config(&self) -> Result<ConfigTree, ConfigError> {
        self.parse_application_config_with(&ParseOptions::defaults())
    }

    pub fn parse_application_config_with(
        &self,
        options: &ParseOptions,
    ) -> Result<ConfigTree, ConfigError> {
        self.inner.parse_application_config(options)
    }

    /// The full configuration: overrides, then this strategy's application
    /// config, then the reference config. Never cached.
    pub fn load(&self) -> Result<ConfigTree, ConfigError> {
        factory::load_with(self.parse_application_config()?)
    }

    /// Select the layered strategy by name and register this instance.
    pub fn install(&self) {
        set_property(STRATEGY_PROPERTY_NAME, Self::NAME);
        self.soft_install();
    }

    /// Register this instance without touching the strategy property.
    ///
    /// Only takes effect if the property already names the layered strategy
    /// (for example through the `CONFIG_STRATEGY` environment variable).
    pub fn soft_install(&self) {
        let replaced = registry::install(self.clone()).is_some();
        tracing::info!(configured = self.configured, replaced, "Installed layered loading strategy");
        factory::invalidate_caches();
    }

    /// Remove this instance's registration if it is still the installed one.
    ///
    /// The strategy property is left as is, so a later [`new`](Self::new)
    /// falls back to the platform default.
    pub fn uninstall(&self) {
        if registry::uninstall_if(&self.inner) {
            tracing::info!("Uninstalled layered loading strategy");
            factory::invalidate_caches();
        } else {
            tracing::debug!("Layered loading strategy was not installed; nothing to uninstall");
        }
    }

    pub fn is_installed(&self) -> bool {
        registry::is_installed(&self.inner)
    }
}

impl Default for LayeredLoadingStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingStrategy for LayeredLoadingStrategy {
    fn parse_application_config(&self, options: &ParseOptions) -> Result<ConfigTree, ConfigError> {
        self.parse_application_config_with(options)
    }
}

impl fmt::Debug for LayeredLoadingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredLoadingStrategy")
            .field("configured", &self.configured)
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Collects layers for a [`LayeredLoadingStrategy`].
///
/// All [`LayerSink`] helpers are available; the first layer added wins.
#[derive(Debug, Clone, Default)]
pub struct LayeredStrategyBuilder {
    layers: LayerStack,
}

impl LayeredStrategyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Create a strategy from the layers declared so far.
    ///
    /// The builder can keep being used; later additions do not affect
    /// strategies already built.
    pub fn build(&self) -> LayeredLoadingStrategy {
        if self.layers.is_empty() {
            tracing::debug!("No layers declared; building platform default strategy");
            LayeredLoadingStrategy::unconfigured()
        } else {
            tracing::debug!(layers = self.layers.len(), "Building layered loading strategy");
            LayeredLoadingStrategy::from_layers(self.layers.clone())
        }
    }

    /// Build and [`install`](LayeredLoadingStrategy::install) in one step.
    pub fn install(&self) -> LayeredLoadingStrategy {
        let strategy = self.build();
        strategy.install();
        strategy
    }
}

impl LayerSink for LayeredStrategyBuilder {
    fn add_layer(&mut self, producer: SharedProducer) {
        self.layers.add(producer);
    }
}
