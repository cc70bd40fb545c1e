//! Layered configuration loading.
//!
//! An application declares an ordered list of configuration layers (files,
//! URLs, resources, in-memory trees, arbitrary loader functions, per-profile
//! groups). The first layer declared wins; objects merge recursively. Layers
//! are evaluated lazily and re-evaluated on every resolution, so a reload
//! picks up changed files and changed active profiles.
//!
//! The resolved stack can be installed as the process default loading
//! strategy, after which [`factory::load`] and [`factory::default_application`]
//! return the layered result:
//!
//! ```no_run
//! use layered_config::{LayerSink, LayeredLoadingStrategy, active_profiles_from_property};
//!
//! let mut builder = LayeredLoadingStrategy::builder();
//! builder
//!     .parse_file("/etc/myapp/overrides.toml")
//!     .for_each_active_profile(
//!         active_profiles_from_property("app.profiles.active"),
//!         true,
//!         |profile, layers| {
//!             layers.parse_resources_any_syntax(format!("application-{profile}"));
//!             Ok(())
//!         },
//!     )
//!     .default_application();
//! builder.install();
//!
//! let config = layered_config::factory::load()?;
//! # Ok::<(), layered_config::ConfigError>(())
//! ```

pub mod constants;
pub mod error;
pub mod factory;
mod loader;
pub mod properties;
pub mod sources;
mod strategy;
pub mod tree;

pub use error::ConfigError;
pub use loader::{
    LayerProducer, LayerSink, LayerStack, SharedProducer, active_profiles_from_property,
    combine_profiles, constant,
};
pub use properties::{load_dotenv, property, set_property};
pub use sources::{ParseOptions, Syntax};
pub use strategy::{
    DefaultLoadingStrategy, LayeredLoadingStrategy, LayeredStrategyBuilder, LoadingStrategy,
};
pub use tree::ConfigTree;
