//! Process-wide configuration properties.
//!
//! Responsibilities:
//! - Hold in-process property overrides (`config.strategy`, `config.file`, ...).
//! - Fall back to environment variables when a property was never set in-process.
//! - Load `.env` files on request so their values become visible through the fallback.
//!
//! Does NOT handle:
//! - Interpreting property values (see `strategy/` and `factory.rs`).
//!
//! Invariants / Assumptions:
//! - In-process values take precedence over environment variables.
//! - `config.strategy` maps to the `CONFIG_STRATEGY` environment variable
//!   (upper-cased, dots and dashes replaced by underscores).
//! - Empty or whitespace-only values are treated as unset; returned values are trimmed.
//! - `load_dotenv()` must be called explicitly; `DOTENV_DISABLED` is checked first.

use std::collections::BTreeMap;
use std::sync::{OnceLock, RwLock};

use crate::constants::DOTENV_DISABLED_VAR;
use crate::error::ConfigError;

fn store() -> &'static RwLock<BTreeMap<String, String>> {
    static STORE: OnceLock<RwLock<BTreeMap<String, String>>> = OnceLock::new();
    STORE.get_or_init(|| RwLock::new(BTreeMap::new()))
}

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// The environment variable consulted for a property name.
pub fn env_var_name(property: &str) -> String {
    property
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

/// Look up a property: in-process value first, then the environment.
pub fn property(name: &str) -> Option<String> {
    let in_process = store()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(name)
        .cloned();
    in_process.or_else(|| env_var_or_none(&env_var_name(name)))
}

/// Set an in-process property, returning the previous in-process value.
pub fn set_property(name: &str, value: impl Into<String>) -> Option<String> {
    let value = value.into();
    tracing::debug!(property = name, "Setting configuration property");
    store()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(name.to_string(), value)
}

/// Remove an in-process property, returning its value if it was set.
pub fn clear_property(name: &str) -> Option<String> {
    store()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .remove(name)
}

/// Snapshot of every in-process property, sorted by name.
pub fn properties() -> BTreeMap<String, String> {
    store()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Check if dotenv loading is disabled via environment variable.
fn dotenv_disabled() -> bool {
    matches!(
        std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Load environment variables from a `.env` file if present.
///
/// If `DOTENV_DISABLED` is set to "true" or "1", nothing is loaded.
///
/// # Errors
///
/// Returns an error if:
/// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
/// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
///
/// Missing `.env` files are silently ignored.
///
/// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
pub fn load_dotenv() -> Result<(), ConfigError> {
    if dotenv_disabled() {
        tracing::debug!("Skipping .env loading because {DOTENV_DISABLED_VAR} is set");
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Ok(())
        }
        Err(e) if is_not_found(&e) => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => Err(ConfigError::DotenvParse { error_index: idx }),
        Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
            kind: io_err.kind(),
        }),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}

/// Check if a dotenv error indicates the file was not found.
fn is_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_env_var_or_none_filters_empty_and_whitespace_strings() {
        let unset = "_LAYERED_CONFIG_TEST_UNSET_VAR";
        assert!(env_var_or_none(unset).is_none());

        temp_env::with_vars([(unset, Some(""))], || {
            assert!(env_var_or_none(unset).is_none());
        });

        temp_env::with_vars([(unset, Some("   "))], || {
            assert!(env_var_or_none(unset).is_none());
        });

        let set = "_LAYERED_CONFIG_TEST_SET_VAR";
        temp_env::with_vars([(set, Some(" test-value "))], || {
            assert_eq!(env_var_or_none(set), Some("test-value".to_string()));
        });
    }

    #[test]
    fn test_env_var_name_mapping() {
        assert_eq!(env_var_name("config.strategy"), "CONFIG_STRATEGY");
        assert_eq!(env_var_name("config.resource.path"), "CONFIG_RESOURCE_PATH");
        assert_eq!(env_var_name("app.log-level"), "APP_LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_in_process_property_beats_environment() {
        let name = "layered.test.precedence";
        temp_env::with_vars([("LAYERED_TEST_PRECEDENCE", Some("from-env"))], || {
            assert_eq!(property(name).as_deref(), Some("from-env"));

            set_property(name, "in-process");
            assert_eq!(property(name).as_deref(), Some("in-process"));

            assert_eq!(clear_property(name).as_deref(), Some("in-process"));
            assert_eq!(property(name).as_deref(), Some("from-env"));
        });
    }

    #[test]
    #[serial]
    fn test_properties_snapshot_is_sorted() {
        set_property("layered.test.b", "2");
        set_property("layered.test.a", "1");

        let snapshot = properties();
        let keys: Vec<_> = snapshot
            .keys()
            .filter(|k| k.starts_with("layered.test."))
            .cloned()
            .collect();
        assert_eq!(keys, vec!["layered.test.a", "layered.test.b"]);

        clear_property("layered.test.a");
        clear_property("layered.test.b");
    }

    #[test]
    #[serial]
    fn test_load_dotenv_respects_disable_switch() {
        temp_env::with_vars([(DOTENV_DISABLED_VAR, Some("1"))], || {
            assert!(load_dotenv().is_ok());
        });
    }

    /// Switches the working directory for the lifetime of the guard.
    struct CwdGuard {
        previous: PathBuf,
    }

    impl CwdGuard {
        fn enter(dir: &TempDir) -> Self {
            let previous = std::env::current_dir().expect("current directory");
            std::env::set_current_dir(dir.path()).expect("enter temp directory");
            Self { previous }
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.previous);
        }
    }

    #[test]
    #[serial]
    fn test_dotenv_values_become_visible_as_properties() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "LAYERED_DOTENV_SAMPLE=from-dotenv\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                (DOTENV_DISABLED_VAR, None::<&str>),
                ("LAYERED_DOTENV_SAMPLE", None),
            ],
            || {
                let _cwd = CwdGuard::enter(&dir);
                assert_eq!(property("layered.dotenv.sample"), None);

                load_dotenv().unwrap();

                assert_eq!(
                    property("layered.dotenv.sample").as_deref(),
                    Some("from-dotenv")
                );
            },
        );
    }

    #[test]
    #[serial]
    fn test_missing_dotenv_is_ignored() {
        let dir = TempDir::new().unwrap();
        temp_env::with_vars([(DOTENV_DISABLED_VAR, None::<&str>)], || {
            let _cwd = CwdGuard::enter(&dir);
            assert!(load_dotenv().is_ok(), "missing .env should be skipped");
        });
    }

    #[test]
    #[serial]
    fn test_dotenv_parse_error_reports_index_without_line_content() {
        let dir = TempDir::new().unwrap();
        let secret = "hunter2_dotenv_secret";
        fs::write(
            dir.path().join(".env"),
            format!("LAYERED_DOTENV_PASSWORD={secret}\nLINE_WITHOUT_EQUALS {secret}\n"),
        )
        .unwrap();

        temp_env::with_vars(
            [
                (DOTENV_DISABLED_VAR, None::<&str>),
                ("LAYERED_DOTENV_PASSWORD", None),
            ],
            || {
                let _cwd = CwdGuard::enter(&dir);
                let err = load_dotenv().unwrap_err();

                assert!(
                    matches!(err, ConfigError::DotenvParse { .. }),
                    "expected DotenvParse, got {err:?}"
                );
                let rendered = format!("{err} {err:?}");
                assert!(
                    !rendered.contains(secret),
                    "dotenv error leaked line content: {rendered}"
                );
                assert!(rendered.contains("DOTENV_DISABLED"));
            },
        );
    }
}
