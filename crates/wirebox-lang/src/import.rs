//! Import source resolution.
//!
//! The interpreter never touches storage itself: it asks a
//! [`SourceResolver`] for the text of a named unit. Two resolvers ship with
//! the crate, an in-memory map and a directory-backed file resolver.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use wirebox_common::constants::SOURCE_EXTENSION;
use wirebox_common::error::{Result, WireboxError};

/// Returns the source text of a named configuration unit.
pub trait SourceResolver {
    /// Resolves `unit` to its source text.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist or cannot be read.
    fn resolve(&self, unit: &str) -> Result<String>;
}

/// Resolver backed by an in-memory map of unit name to source.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceResolver {
    units: HashMap<String, String>,
}

impl MemorySourceResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a unit.
    #[must_use]
    pub fn with_unit(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    /// Adds or replaces a unit.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        let _ = self.units.insert(name.into(), source.into());
    }
}

impl SourceResolver for MemorySourceResolver {
    fn resolve(&self, unit: &str) -> Result<String> {
        self.units
            .get(unit)
            .cloned()
            .ok_or_else(|| WireboxError::Config {
                message: format!("unit \"{unit}\" not found"),
            })
    }
}

/// Resolver that reads units from files below a root directory.
///
/// `shared/logging` resolves to `<root>/shared/logging.wbx` and
/// `shared.logging` to `<root>/shared.logging.wbx`. A unit already ending in
/// the configured extension is used as is. Units never leave the root.
#[derive(Debug, Clone)]
pub struct FileSourceResolver {
    root: PathBuf,
    extension: String,
}

impl FileSourceResolver {
    /// Creates a resolver rooted at `root` using the default extension.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: SOURCE_EXTENSION.to_owned(),
        }
    }

    /// Overrides the extension appended to bare unit names.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_owned();
        self
    }

    /// Path a unit name maps to.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Config`] if `unit` is absolute or climbs out
    /// of the root with `..`.
    pub fn path_for(&self, unit: &str) -> Result<PathBuf> {
        let relative = Path::new(unit);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(WireboxError::Config {
                message: format!("unit \"{unit}\" must be a relative path below the source root"),
            });
        }

        let suffix = format!(".{}", self.extension);
        if self.extension.is_empty() || unit.ends_with(&suffix) {
            Ok(self.root.join(relative))
        } else {
            Ok(self.root.join(format!("{unit}{suffix}")))
        }
    }

    /// Root directory units are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceResolver for FileSourceResolver {
    fn resolve(&self, unit: &str) -> Result<String> {
        let path = self.path_for(unit)?;
        tracing::debug!(unit, path = %path.display(), "reading unit");
        std::fs::read_to_string(&path).map_err(|e| WireboxError::Io { path, source: e })
    }
}
