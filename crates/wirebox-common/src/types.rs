//! Domain primitive types used across the wirebox workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireboxError};

/// A literal value: parameter values, raw arguments, and metadata payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Quoted string literal.
    String(String),
    /// `{a, b, ...}` list literal.
    List(Vec<Value>),
}

impl Value {
    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Hierarchical name of a compiled container module, e.g.
/// `app::di::AppContainer`.
///
/// Both `::` and `\` are accepted as separators on input; the canonical
/// form uses `::`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleName {
    namespace: Vec<String>,
    local: String,
}

impl ModuleName {
    /// Parses and validates a module name.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Builder`] if the name is empty, starts with a
    /// digit, has an empty segment, or contains characters other than
    /// alphanumerics, `_`, and the separator.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(WireboxError::builder("module name cannot be empty"));
        }
        if raw.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(WireboxError::builder(format!(
                "module name \"{raw}\" cannot start with a digit"
            )));
        }

        let normalized = raw.replace('\\', "::");
        let mut segments: Vec<String> = Vec::new();
        for segment in normalized.split("::") {
            if segment.is_empty() {
                return Err(WireboxError::builder(format!(
                    "module name \"{raw}\" contains an empty segment"
                )));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(WireboxError::builder(format!(
                    "module name \"{raw}\" may only contain alphanumerics, `_` and separators"
                )));
            }
            segments.push(segment.to_owned());
        }

        let local = segments.pop().unwrap_or_default();
        if local.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(WireboxError::builder(format!(
                "module identifier \"{local}\" cannot start with a digit"
            )));
        }
        Ok(Self {
            namespace: segments,
            local,
        })
    }

    /// Namespace prefix segments (may be empty).
    #[must_use]
    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    /// Local identifier, the last segment.
    #[must_use]
    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{segment}::")?;
        }
        write!(f, "{}", self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_name_splits_namespace_and_local() {
        let name = ModuleName::parse("app::di::AppContainer").expect("valid");
        assert_eq!(name.namespace(), ["app", "di"]);
        assert_eq!(name.local(), "AppContainer");
        assert_eq!(name.to_string(), "app::di::AppContainer");
    }

    #[test]
    fn module_name_accepts_backslash_separator() {
        let name = ModuleName::parse("Acme\\Container").expect("valid");
        assert_eq!(name.namespace(), ["Acme"]);
        assert_eq!(name.local(), "Container");
    }

    #[test]
    fn module_name_without_namespace() {
        let name = ModuleName::parse("Plain").expect("valid");
        assert!(name.namespace().is_empty());
        assert_eq!(name.local(), "Plain");
    }

    #[test]
    fn module_name_rejects_invalid_input() {
        for bad in ["", "1Container", "app::", "app::::X", "app-x::Y", "a b", "app::2nd"] {
            assert!(ModuleName::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn value_display_renders_literals() {
        let value = Value::List(vec![
            Value::from("a"),
            Value::Int(1),
            Value::Bool(false),
            Value::Null,
        ]);
        assert_eq!(value.to_string(), r#"{"a", 1, false, null}"#);
    }

    #[test]
    fn value_json_is_untagged() {
        let json = serde_json::to_string(&Value::from("localhost")).expect("serialize");
        assert_eq!(json, r#""localhost""#);
        let back: Value = serde_json::from_str("[1, true]").expect("deserialize");
        assert_eq!(back, Value::List(vec![Value::Int(1), Value::Bool(true)]));
    }
}
