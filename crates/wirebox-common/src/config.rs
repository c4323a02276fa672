//! Build configuration model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireboxError};

/// Settings for turning configuration units into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Hierarchical name of the compiled module.
    pub module: String,
    /// Directory that unit names are resolved against.
    pub source_root: PathBuf,
    /// File extension appended to unit names without one.
    pub extension: String,
    /// Unit interpreted first; everything else arrives through imports.
    pub entry: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            module: crate::constants::DEFAULT_MODULE_NAME.to_owned(),
            source_root: PathBuf::from("."),
            extension: crate::constants::SOURCE_EXTENSION.to_owned(),
            entry: crate::constants::DEFAULT_ENTRY_UNIT.to_owned(),
        }
    }
}

impl BuildConfig {
    /// Loads a configuration from a JSON file. Missing keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| WireboxError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
