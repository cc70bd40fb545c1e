//! Error types for configuration layering.
//!
//! Responsibilities:
//! - Define one error family for everything that can surface from building or
//!   resolving a layer stack.
//! - Fold arbitrary caller-supplied producer failures into that family.
//!
//! Does NOT handle:
//! - Retrying or suppressing failures. A failing layer aborts the whole resolution.
//!
//! Invariants:
//! - All error variants carry the origin (path, URL, resource name) they came from.
//! - A failure that already is a `ConfigError` is never wrapped a second time.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use thiserror::Error;

/// Errors that can occur while building or resolving configuration layers.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A string given where a URL was expected did not parse.
    ///
    /// Raised when the layer is declared, never deferred into resolution.
    #[error("URL is not valid: {input}: {message}")]
    MalformedInput { input: String, message: String },

    /// A file, URL, or resource could not be read and was not optional.
    #[error("Configuration source {origin} is unavailable: {reason}")]
    SourceUnavailable { origin: String, reason: String },

    #[error("Failed to parse configuration from {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Configuration from {origin} must have an object at its root")]
    InvalidRoot { origin: String },

    /// Any non-configuration failure raised by a caller-supplied producer.
    #[error("Uncaught exception while loading config: {0}")]
    Uncaught(#[source] anyhow::Error),

    #[error("No loading strategy registered under the name '{0}'")]
    UnknownStrategy(String),

    #[error("Only one of these properties may be set at a time: {}", .0.join(", "))]
    ConflictingProperties(Vec<String>),

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    /// Convert a failure raised by a caller-supplied loader into a `ConfigError`.
    ///
    /// Configuration errors pass through untouched; anything else becomes
    /// [`ConfigError::Uncaught`].
    pub fn from_producer_failure(error: impl Into<anyhow::Error>) -> Self {
        match error.into().downcast::<ConfigError>() {
            Ok(config_error) => config_error,
            Err(other) => ConfigError::Uncaught(other),
        }
    }

    pub(crate) fn unavailable(origin: impl Into<String>, reason: impl ToString) -> Self {
        ConfigError::SourceUnavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(origin: impl Into<String>, message: impl ToString) -> Self {
        ConfigError::Parse {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_passes_through_unwrapped() {
        let original = ConfigError::UnknownStrategy("custom".to_string());
        let converted = ConfigError::from_producer_failure(anyhow::Error::new(original));
        assert!(matches!(converted, ConfigError::UnknownStrategy(name) if name == "custom"));
    }

    #[test]
    fn test_foreign_error_becomes_uncaught() {
        let io = std::io::Error::new(ErrorKind::PermissionDenied, "vault sealed");
        let converted = ConfigError::from_producer_failure(io);
        assert!(matches!(converted, ConfigError::Uncaught(_)));
        assert!(converted.to_string().contains("vault sealed"));
    }

    #[test]
    fn test_conflicting_properties_lists_names() {
        let err = ConfigError::ConflictingProperties(vec![
            "config.file".to_string(),
            "config.url".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Only one of these properties may be set at a time: config.file, config.url"
        );
    }
}
