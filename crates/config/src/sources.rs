//! Parse functions that turn files, URLs, and resources into configuration trees.
//!
//! Responsibilities:
//! - Read a source and hand its text to the matching serde format crate.
//! - Decide what a missing source means from `ParseOptions::allow_missing`.
//! - Resolve resource names against the resource search path.
//!
//! Does NOT handle:
//! - Ordering or merging layers (see `loader/stack.rs`).
//! - Deferring work: every function here runs immediately when called.
//!
//! Invariants:
//! - `Ok(None)` means "missing and allowed to be missing"; it is never returned
//!   for a source that exists.
//! - When several files back one resource, the earlier root and the
//!   higher-ranked syntax win.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use url::Url;

use crate::constants::RESOURCE_PATH_PROPERTY;
use crate::error::ConfigError;
use crate::properties::property;
use crate::tree::ConfigTree;

/// Text formats understood by the parse functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Json,
    Toml,
    Yaml,
}

impl Syntax {
    /// Extensions tried by any-syntax lookups, highest priority first.
    const ANY_SYNTAX_EXTENSIONS: &'static [(&'static str, Syntax)] = &[
        ("toml", Syntax::Toml),
        ("yaml", Syntax::Yaml),
        ("yml", Syntax::Yaml),
        ("json", Syntax::Json),
    ];

    /// Guess the syntax from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Syntax::Json),
            "toml" => Some(Syntax::Toml),
            "yaml" | "yml" => Some(Syntax::Yaml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Guess the syntax from an HTTP `Content-Type` header value.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if mime.ends_with("json") {
            Some(Syntax::Json)
        } else if mime.ends_with("toml") {
            Some(Syntax::Toml)
        } else if mime.ends_with("yaml") || mime.ends_with("yml") {
            Some(Syntax::Yaml)
        } else {
            None
        }
    }
}

/// Options controlling a single parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Forced syntax; when `None` it is guessed from the source.
    pub syntax: Option<Syntax>,
    /// Whether a missing source yields "absent" instead of an error.
    pub allow_missing: bool,
    /// Replaces the path/URL in error messages.
    pub origin_description: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            syntax: None,
            allow_missing: true,
            origin_description: None,
        }
    }
}

impl ParseOptions {
    pub fn defaults() -> Self {
        Self::default()
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    pub fn with_allow_missing(mut self, allow_missing: bool) -> Self {
        self.allow_missing = allow_missing;
        self
    }

    pub fn with_origin_description(mut self, description: impl Into<String>) -> Self {
        self.origin_description = Some(description.into());
        self
    }

    fn origin(&self, fallback: impl FnOnce() -> String) -> String {
        self.origin_description.clone().unwrap_or_else(fallback)
    }
}

/// Parse configuration text in the given syntax.
pub fn parse_string(text: &str, syntax: Syntax) -> Result<ConfigTree, ConfigError> {
    parse_text(text, syntax, "string")
}

fn parse_text(text: &str, syntax: Syntax, origin: &str) -> Result<ConfigTree, ConfigError> {
    let value = match syntax {
        Syntax::Json => {
            serde_json::from_str::<Value>(text).map_err(|e| ConfigError::parse(origin, e))?
        }
        Syntax::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| ConfigError::parse(origin, e))?;
            reject_non_finite_yaml(&yaml, origin)?;
            serde_yaml::from_value(yaml).map_err(|e| ConfigError::parse(origin, e))?
        }
        Syntax::Toml => {
            let table: toml::Table =
                toml::from_str(text).map_err(|e| ConfigError::parse(origin, e))?;
            toml_to_json(toml::Value::Table(table), origin)?
        }
    };
    ConfigTree::from_value_with_origin(value, origin)
}

fn non_finite(origin: &str, value: f64) -> ConfigError {
    ConfigError::parse(
        origin,
        format!("non-finite number {value} cannot be represented in a configuration tree"),
    )
}

/// Convert a TOML value to a JSON value.
///
/// JSON has no NaN or infinity; those floats are rejected rather than
/// turned into null, which would erase lower layers on merge.
fn toml_to_json(toml: toml::Value, origin: &str) -> Result<Value, ConfigError> {
    Ok(match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| non_finite(origin, f))?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(
            arr.into_iter()
                .map(|v| toml_to_json(v, origin))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| Ok((k, toml_to_json(v, origin)?)))
                .collect::<Result<Map<String, Value>, ConfigError>>()?,
        ),
    })
}

/// YAML `.nan` and `.inf` would otherwise deserialize to JSON null.
fn reject_non_finite_yaml(yaml: &serde_yaml::Value, origin: &str) -> Result<(), ConfigError> {
    match yaml {
        serde_yaml::Value::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Err(non_finite(origin, f)),
            _ => Ok(()),
        },
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .try_for_each(|item| reject_non_finite_yaml(item, origin)),
        serde_yaml::Value::Mapping(map) => map
            .values()
            .try_for_each(|item| reject_non_finite_yaml(item, origin)),
        serde_yaml::Value::Tagged(tagged) => reject_non_finite_yaml(&tagged.value, origin),
        _ => Ok(()),
    }
}

/// Parse a configuration file.
///
/// The syntax comes from `options.syntax`, then the file extension, then
/// defaults to JSON.
pub fn parse_file(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Option<ConfigTree>, ConfigError> {
    let path = path.as_ref();
    let origin = options.origin(|| path.display().to_string());

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound && options.allow_missing => {
            tracing::debug!(origin = %origin, "Optional configuration file is missing");
            return Ok(None);
        }
        Err(e) => return Err(ConfigError::unavailable(origin, e)),
    };

    let syntax = options
        .syntax
        .or_else(|| Syntax::from_path(path))
        .unwrap_or(Syntax::Json);
    let tree = parse_text(&text, syntax, &origin)?;
    tracing::debug!(origin = %origin, ?syntax, keys = tree.root().len(), "Parsed configuration file");
    Ok(Some(tree))
}

/// Parse configuration fetched from a URL.
///
/// `file` URLs are read from disk; `http` and `https` URLs are fetched with a
/// blocking GET. A 404 counts as missing.
pub fn parse_url(url: &Url, options: &ParseOptions) -> Result<Option<ConfigTree>, ConfigError> {
    match url.scheme() {
        "file" => {
            let path = url.to_file_path().map_err(|()| {
                ConfigError::unavailable(url.as_str(), "file URL has no local path")
            })?;
            let options = options
                .clone()
                .with_origin_description(options.origin(|| url.to_string()));
            parse_file(path, &options)
        }
        "http" | "https" => fetch_http(url, options),
        scheme => Err(ConfigError::unavailable(
            url.as_str(),
            format!("unsupported URL scheme '{scheme}'"),
        )),
    }
}

fn fetch_http(url: &Url, options: &ParseOptions) -> Result<Option<ConfigTree>, ConfigError> {
    let origin = options.origin(|| url.to_string());
    tracing::trace!(origin = %origin, "Fetching configuration over HTTP");

    let response =
        reqwest::blocking::get(url.clone()).map_err(|e| ConfigError::unavailable(&origin, e))?;
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND && options.allow_missing {
        tracing::debug!(origin = %origin, "Optional configuration URL returned 404");
        return Ok(None);
    }
    if !status.is_success() {
        return Err(ConfigError::unavailable(origin, format!("HTTP status {status}")));
    }

    let content_type_syntax = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(Syntax::from_content_type);
    let syntax = options
        .syntax
        .or(content_type_syntax)
        .or_else(|| Syntax::from_path(Path::new(url.path())))
        .unwrap_or(Syntax::Json);

    let body = response
        .text()
        .map_err(|e| ConfigError::unavailable(&origin, e))?;
    let tree = parse_text(&body, syntax, &origin)?;
    tracing::debug!(origin = %origin, ?syntax, "Parsed configuration URL");
    Ok(Some(tree))
}

/// Directories searched for resources, in priority order.
///
/// Read from the `config.resource.path` property on every call; defaults to
/// the current directory.
pub fn resource_roots() -> Vec<PathBuf> {
    match property(RESOURCE_PATH_PROPERTY) {
        Some(value) => std::env::split_paths(&value).collect(),
        None => vec![PathBuf::from(".")],
    }
}

/// Parse every file named `name` found on the resource path.
///
/// All hits are merged, with earlier roots winning.
pub fn parse_resources(name: &str, options: &ParseOptions) -> Result<Option<ConfigTree>, ConfigError> {
    let found = find_resources(name, options)?;
    if found.is_none() && !options.allow_missing {
        return Err(ConfigError::unavailable(
            options.origin(|| name.to_string()),
            "resource not found on the resource path",
        ));
    }
    Ok(found)
}

fn find_resources(name: &str, options: &ParseOptions) -> Result<Option<ConfigTree>, ConfigError> {
    let mut merged: Option<ConfigTree> = None;
    for root in resource_roots() {
        let candidate = root.join(name);
        if !candidate.is_file() {
            continue;
        }
        let file_options = ParseOptions {
            allow_missing: true,
            origin_description: None,
            ..options.clone()
        };
        if let Some(tree) = parse_file(&candidate, &file_options)? {
            merged = Some(match merged {
                Some(higher) => higher.with_fallback(tree),
                None => tree,
            });
        }
    }
    Ok(merged)
}

/// Parse a resource by base name, trying every supported extension.
///
/// `basename.toml` beats `basename.yaml`/`basename.yml`, which beat
/// `basename.json`; all that exist are merged. A name that already carries a
/// known extension is looked up as-is.
pub fn parse_resources_any_syntax(
    basename: &str,
    options: &ParseOptions,
) -> Result<Option<ConfigTree>, ConfigError> {
    if Syntax::from_path(Path::new(basename)).is_some() {
        return parse_resources(basename, options);
    }

    let mut merged: Option<ConfigTree> = None;
    for (extension, syntax) in Syntax::ANY_SYNTAX_EXTENSIONS {
        if options.syntax.is_some_and(|forced| forced != *syntax) {
            continue;
        }
        let name = format!("{basename}.{extension}");
        let per_syntax = ParseOptions {
            syntax: Some(*syntax),
            ..options.clone()
        };
        if let Some(tree) = find_resources(&name, &per_syntax)? {
            merged = Some(match merged {
                Some(higher) => higher.with_fallback(tree),
                None => tree,
            });
        }
    }

    if merged.is_none() && !options.allow_missing {
        return Err(ConfigError::unavailable(
            options.origin(|| basename.to_string()),
            "no resource with a supported extension found on the resource path",
        ));
    }
    Ok(merged)
}
