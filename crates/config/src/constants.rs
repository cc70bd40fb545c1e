//! Centralized constants for configuration layering.
//!
//! Property names are pinned to the names the loading framework reads; there
//! is no runtime discovery of alternative names.

// =============================================================================
// Property Names
// =============================================================================

/// Property naming the loading strategy the factory instantiates.
pub const STRATEGY_PROPERTY_NAME: &str = "config.strategy";

/// Property naming a single file to use as the application config.
pub const CONFIG_FILE_PROPERTY: &str = "config.file";

/// Property naming a single resource to use as the application config.
pub const CONFIG_RESOURCE_PROPERTY: &str = "config.resource";

/// Property naming a single URL to use as the application config.
pub const CONFIG_URL_PROPERTY: &str = "config.url";

/// Property listing the directories searched for resources.
pub const RESOURCE_PATH_PROPERTY: &str = "config.resource.path";

// =============================================================================
// Resource Names
// =============================================================================

/// Base name of the application resource.
pub const APPLICATION_RESOURCE: &str = "application";

/// Base name of the reference resource layered under every application config.
pub const REFERENCE_RESOURCE: &str = "reference";

// =============================================================================
// Environment
// =============================================================================

/// Environment variable that disables `.env` loading when set to `1` or `true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";
