//! Fluent helpers for declaring configuration layers.
//!
//! Responsibilities:
//! - Provide one generic entry point (`with`) that lifts any loader function into a layer.
//! - Provide convenience helpers for files, URLs, resources, the default
//!   application config, and profile expansion, all expressed through `with`.
//!
//! Does NOT handle:
//! - Merging (see `stack.rs`).
//! - Parsing (see `sources.rs`).
//!
//! Invariants / Assumptions:
//! - Every helper adds exactly one layer, below every layer added before it.
//! - URL strings are validated when the layer is declared; the fetch itself is deferred.
//! - Nothing is read from disk or network until the stack resolves (static
//!   profile lists are the exception: their callbacks run immediately).

use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use super::layer::{SharedProducer, constant};
use super::profiles::{dynamic_profiles, static_profiles};
use super::stack::LayerStack;
use crate::error::ConfigError;
use crate::sources::{self, ParseOptions};
use crate::strategy::{DefaultLoadingStrategy, LoadingStrategy};
use crate::tree::ConfigTree;

/// Anything layers can be added to.
///
/// Earlier additions win over later ones:
///
/// ```no_run
/// use layered_config::{LayerSink, LayeredLoadingStrategy};
///
/// let strategy = LayeredLoadingStrategy::builder()
///     .parse_resources_any_syntax("application-prod-eu")
///     .parse_resources_any_syntax("application-prod")
///     .parse_resources_any_syntax("application")
///     .build();
/// ```
pub trait LayerSink {
    /// Add a producer as the new lowest-priority layer.
    fn add_layer(&mut self, producer: SharedProducer);

    /// Add any loader function as a layer.
    ///
    /// The loader may return a tree or an optional tree (`None` = absent).
    /// Failures that are not already a [`ConfigError`] surface from
    /// resolution as [`ConfigError::Uncaught`].
    fn with<F, T, E>(&mut self, loader: F) -> &mut Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: Into<Option<ConfigTree>>,
        E: Into<anyhow::Error>,
    {
        self.add_layer(Arc::new(move || -> Result<Option<ConfigTree>, ConfigError> {
            loader()
                .map(Into::into)
                .map_err(ConfigError::from_producer_failure)
        }));
        self
    }

    /// Add a one-argument loader function together with its argument.
    fn apply<P, F, T, E>(&mut self, loader: F, param: P) -> &mut Self
    where
        P: Send + Sync + 'static,
        F: Fn(&P) -> Result<T, E> + Send + Sync + 'static,
        T: Into<Option<ConfigTree>>,
        E: Into<anyhow::Error>,
    {
        self.with(move || loader(&param))
    }

    /// Add an already-built tree as a layer.
    fn with_tree(&mut self, tree: ConfigTree) -> &mut Self {
        self.add_layer(constant(tree));
        self
    }

    /// Add a layer fetched from a URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedInput`] right away if `url` does not
    /// parse; no layer is added in that case.
    fn parse_url(&mut self, url: &str) -> Result<&mut Self, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::MalformedInput {
            input: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(self.parse_url_with(parsed, ParseOptions::defaults()))
    }

    fn parse_url_with(&mut self, url: Url, options: ParseOptions) -> &mut Self {
        self.with(move || sources::parse_url(&url, &options))
    }

    fn parse_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.parse_file_with(path, ParseOptions::defaults())
    }

    fn parse_file_with(&mut self, path: impl Into<PathBuf>, options: ParseOptions) -> &mut Self {
        let path = path.into();
        self.with(move || sources::parse_file(&path, &options))
    }

    /// Add a layer from an exact resource name on the resource path.
    fn parse_resources(&mut self, name: impl Into<String>) -> &mut Self {
        self.parse_resources_with(name, ParseOptions::defaults())
    }

    fn parse_resources_with(&mut self, name: impl Into<String>, options: ParseOptions) -> &mut Self {
        let name = name.into();
        self.with(move || sources::parse_resources(&name, &options))
    }

    /// Add a layer from a resource base name, trying every supported extension.
    fn parse_resources_any_syntax(&mut self, basename: impl Into<String>) -> &mut Self {
        self.parse_resources_any_syntax_with(basename, ParseOptions::defaults())
    }

    fn parse_resources_any_syntax_with(
        &mut self,
        basename: impl Into<String>,
        options: ParseOptions,
    ) -> &mut Self {
        let basename = basename.into();
        self.with(move || sources::parse_resources_any_syntax(&basename, &options))
    }

    /// Add the platform default application config as a layer.
    ///
    /// This calls [`DefaultLoadingStrategy`] directly, never the factory, so
    /// an installed layered strategy cannot end up loading itself.
    fn default_application(&mut self) -> &mut Self {
        self.default_application_with(ParseOptions::defaults())
    }

    fn default_application_with(&mut self, options: ParseOptions) -> &mut Self {
        self.with(move || DefaultLoadingStrategy.parse_application_config(&options))
    }

    /// Add one composite layer configured once per profile.
    ///
    /// The callback runs immediately for each profile. With `prefer_first`
    /// the first profile outranks the rest, otherwise the last one does.
    fn for_each_profile<P, I, C>(
        &mut self,
        profiles: I,
        prefer_first: bool,
        callback: C,
    ) -> Result<&mut Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        C: Fn(&P, &mut LayerStack) -> Result<(), ConfigError>,
    {
        self.add_layer(static_profiles(profiles, prefer_first, callback)?);
        Ok(self)
    }

    /// Like [`for_each_profile`](Self::for_each_profile), but the profile list
    /// is supplied and expanded again on every resolution, so later changes
    /// to the active profiles are picked up on reload.
    fn for_each_active_profile<P, S, C>(
        &mut self,
        supplier: S,
        prefer_first: bool,
        callback: C,
    ) -> &mut Self
    where
        P: 'static,
        S: Fn() -> Vec<P> + Send + Sync + 'static,
        C: Fn(&P, &mut LayerStack) -> Result<(), ConfigError> + Send + Sync + 'static,
    {
        self.add_layer(dynamic_profiles(supplier, prefer_first, callback));
        self
    }
}

impl LayerSink for LayerStack {
    fn add_layer(&mut self, producer: SharedProducer) {
        self.add(producer);
    }
}
