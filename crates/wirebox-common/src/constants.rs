//! Workspace-wide constants.

/// Name that always resolves to the container itself.
pub const SELF_NAME: &str = "container";

/// Default file extension of configuration units.
pub const SOURCE_EXTENSION: &str = "wbx";

/// Default entry unit looked up by the CLI when none is given.
pub const DEFAULT_ENTRY_UNIT: &str = "app";

/// Default module name for compiled containers.
pub const DEFAULT_MODULE_NAME: &str = "wirebox::generated::AppContainer";

/// Metadata tag naming a static factory method used instead of plain
/// construction.
pub const FACTORY_TAG: &str = "factory";

/// Prefix of every generated resolver method name.
pub const RESOLVER_PREFIX: &str = "resolve";

/// Application name used in CLI output.
pub const APP_NAME: &str = "wirebox";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "wbx";
