//! The loading framework: strategy selection, caching, and the final
//! overrides/application/reference merge.
//!
//! Responsibilities:
//! - Instantiate the strategy named by `config.strategy` (default: `default`).
//! - Cache the application config and the fully loaded config.
//! - Drop those caches when the installed strategy changes.
//!
//! Does NOT handle:
//! - Declaring layers or installing strategies (see `strategy/`).
//!
//! Invariants / Assumptions:
//! - Unknown strategy names are an error, not a silent fallback.
//! - Overrides beat the application config, which beats the reference config.
//! - A value computed before an invalidation is never stored after it.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::constants::{REFERENCE_RESOURCE, STRATEGY_PROPERTY_NAME};
use crate::error::ConfigError;
use crate::properties::{properties, property};
use crate::sources::{self, ParseOptions};
use crate::strategy::{DefaultLoadingStrategy, LayeredLoadingStrategy, LoadingStrategy};
use crate::tree::ConfigTree;

/// Creates a strategy instance for the factory.
pub type StrategyConstructor = fn() -> Arc<dyn LoadingStrategy>;

fn default_strategy() -> Arc<dyn LoadingStrategy> {
    Arc::new(DefaultLoadingStrategy)
}

fn layered_strategy() -> Arc<dyn LoadingStrategy> {
    Arc::new(LayeredLoadingStrategy::new())
}

fn strategies() -> &'static RwLock<BTreeMap<String, StrategyConstructor>> {
    static STRATEGIES: OnceLock<RwLock<BTreeMap<String, StrategyConstructor>>> = OnceLock::new();
    STRATEGIES.get_or_init(|| {
        let mut table = BTreeMap::new();
        table.insert(
            DefaultLoadingStrategy::NAME.to_string(),
            default_strategy as StrategyConstructor,
        );
        table.insert(
            LayeredLoadingStrategy::NAME.to_string(),
            layered_strategy as StrategyConstructor,
        );
        RwLock::new(table)
    })
}

/// Make a strategy selectable through `config.strategy`.
///
/// Returns the constructor previously registered under `name`, if any.
pub fn register_strategy(
    name: impl Into<String>,
    constructor: StrategyConstructor,
) -> Option<StrategyConstructor> {
    let name = name.into();
    tracing::debug!(strategy = %name, "Registering loading strategy");
    let previous = strategies()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(name, constructor);
    invalidate_caches();
    previous
}

/// Instantiate the strategy currently named by `config.strategy`.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownStrategy`] if no strategy is registered
/// under that name.
pub fn strategy() -> Result<Arc<dyn LoadingStrategy>, ConfigError> {
    let Some(name) = property(STRATEGY_PROPERTY_NAME) else {
        return Ok(default_strategy());
    };
    let constructor = strategies()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&name)
        .copied()
        .ok_or_else(|| ConfigError::UnknownStrategy(name.clone()))?;
    tracing::trace!(strategy = %name, "Instantiating loading strategy");
    Ok(constructor())
}

struct Caches {
    generation: u64,
    application: Option<ConfigTree>,
    loaded: Option<ConfigTree>,
}

static CACHES: RwLock<Caches> = RwLock::new(Caches {
    generation: 0,
    application: None,
    loaded: None,
});

fn read_cached(select: fn(&Caches) -> &Option<ConfigTree>) -> (u64, Option<ConfigTree>) {
    let caches = CACHES.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    (caches.generation, select(&caches).clone())
}

fn store_cached(generation: u64, store: impl FnOnce(&mut Caches)) {
    let mut caches = CACHES.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    if caches.generation == generation {
        store(&mut caches);
    } else {
        tracing::debug!("Caches invalidated while loading; result not cached");
    }
}

/// The application config from the current strategy, cached until the next
/// [`invalidate_caches`].
pub fn default_application() -> Result<ConfigTree, ConfigError> {
    let (generation, cached) = read_cached(|c| &c.application);
    if let Some(tree) = cached {
        return Ok(tree);
    }
    let tree = default_application_with(&ParseOptions::defaults())?;
    store_cached(generation, |c| c.application = Some(tree.clone()));
    Ok(tree)
}

/// The application config from the current strategy with explicit options.
/// Never cached.
pub fn default_application_with(options: &ParseOptions) -> Result<ConfigTree, ConfigError> {
    strategy()?.parse_application_config(options)
}

/// Overrides, application, and reference config merged, cached until the
/// next [`invalidate_caches`].
pub fn load() -> Result<ConfigTree, ConfigError> {
    let (generation, cached) = read_cached(|c| &c.loaded);
    if let Some(tree) = cached {
        return Ok(tree);
    }
    let tree = load_with(default_application()?)?;
    store_cached(generation, |c| c.loaded = Some(tree.clone()));
    Ok(tree)
}

/// Merge `application` between the overrides and the reference config.
pub fn load_with(application: ConfigTree) -> Result<ConfigTree, ConfigError> {
    Ok(default_overrides()
        .with_fallback(application)
        .with_fallback(default_reference()?))
}

/// In-process properties as a tree; they override every other source.
pub fn default_overrides() -> ConfigTree {
    ConfigTree::from_dotted_pairs(properties())
}

/// The `reference` resource in any syntax, empty if missing.
pub fn default_reference() -> Result<ConfigTree, ConfigError> {
    Ok(
        sources::parse_resources_any_syntax(REFERENCE_RESOURCE, &ParseOptions::defaults())?
            .unwrap_or_default(),
    )
}

/// Drop every cached config so the next load consults the current strategy.
pub fn invalidate_caches() {
    let mut caches = CACHES.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    caches.generation = caches.generation.wrapping_add(1);
    caches.application = None;
    caches.loaded = None;
    tracing::debug!(generation = caches.generation, "Invalidated configuration caches");
}
