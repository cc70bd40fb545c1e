//! The platform default loading strategy.
//!
//! Responsibilities:
//! - Honor an explicit application source named by `config.resource`,
//!   `config.file`, or `config.url`.
//! - Otherwise load the `application` resource in any supported syntax.
//! - `config.resource` is an exact resource name; no extension is appended.
//!
//! Invariants:
//! - At most one explicit source property may be set.
//! - An explicitly named source must exist; the implicit `application`
//!   resource may be missing and then yields an empty tree.

use url::Url;

use super::LoadingStrategy;
use crate::constants::{
    APPLICATION_RESOURCE, CONFIG_FILE_PROPERTY, CONFIG_RESOURCE_PROPERTY, CONFIG_URL_PROPERTY,
};
use crate::error::ConfigError;
use crate::properties::property;
use crate::sources::{self, ParseOptions};
use crate::tree::ConfigTree;

/// Loads the application config the way the factory does when no other
/// strategy is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultLoadingStrategy;

impl DefaultLoadingStrategy {
    /// Name under which the factory knows this strategy.
    pub const NAME: &'static str = "default";
}

enum ExplicitSource {
    Resource(String),
    File(String),
    Url(String),
}

fn explicit_source() -> Result<Option<ExplicitSource>, ConfigError> {
    let candidates = [
        (CONFIG_RESOURCE_PROPERTY, property(CONFIG_RESOURCE_PROPERTY).map(ExplicitSource::Resource)),
        (CONFIG_FILE_PROPERTY, property(CONFIG_FILE_PROPERTY).map(ExplicitSource::File)),
        (CONFIG_URL_PROPERTY, property(CONFIG_URL_PROPERTY).map(ExplicitSource::Url)),
    ];

    let set: Vec<String> = candidates
        .iter()
        .filter(|(_, value)| value.is_some())
        .map(|(name, _)| name.to_string())
        .collect();
    if set.len() > 1 {
        return Err(ConfigError::ConflictingProperties(set));
    }

    Ok(candidates.into_iter().find_map(|(_, value)| value))
}

impl LoadingStrategy for DefaultLoadingStrategy {
    fn parse_application_config(&self, options: &ParseOptions) -> Result<ConfigTree, ConfigError> {
        let Some(source) = explicit_source()? else {
            tracing::debug!(resource = APPLICATION_RESOURCE, "Loading default application config");
            return Ok(sources::parse_resources_any_syntax(APPLICATION_RESOURCE, options)?
                .unwrap_or_default());
        };

        let required = options.clone().with_allow_missing(false);
        let tree = match source {
            ExplicitSource::Resource(name) => {
                tracing::debug!(resource = %name, "Loading application config from resource");
                sources::parse_resources(&name, &required)?
            }
            ExplicitSource::File(path) => {
                tracing::debug!(path = %path, "Loading application config from file");
                sources::parse_file(&path, &required)?
            }
            ExplicitSource::Url(raw) => {
                tracing::debug!(url = %raw, "Loading application config from URL");
                let url = Url::parse(&raw).map_err(|e| ConfigError::MalformedInput {
                    input: raw.clone(),
                    message: e.to_string(),
                })?;
                sources::parse_url(&url, &required)?
            }
        };
        Ok(tree.unwrap_or_default())
    }
}
