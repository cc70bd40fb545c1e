//! Loading strategies: what the factory calls to obtain the application config.
//!
//! Responsibilities:
//! - Define the `LoadingStrategy` seam the factory consults.
//! - Provide the platform default (`default.rs`) and the layered strategy
//!   built from a layer stack (`layered.rs`).
//! - Hold the process-wide installed strategy (`registry.rs`).
//!
//! Does NOT handle:
//! - Caching resolved trees (see `factory.rs`).
//!
//! Invariants / Assumptions:
//! - Strategies may be called from any thread at any time.
//! - A layered strategy resolves its stack anew on every call.

mod default;
mod layered;
mod registry;


pub use default::DefaultLoadingStrategy;
pub use layered::{LayeredLoadingStrategy, LayeredStrategyBuilder};

use crate::error::ConfigError;
use crate::sources::ParseOptions;
use crate::tree::ConfigTree;

/// Produces the application configuration for the factory.
pub trait LoadingStrategy: Send + Sync {
    fn parse_application_config(&self, options: &ParseOptions) -> Result<ConfigTree, ConfigError>;
}
