//! Resolver kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a registered name produces its value. Exactly one per name; binding
/// a name replaces its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ResolverKind {
    /// A compiled resolver unit, dispatched through the method-name table.
    Method,
    /// Unshared factory, invoked on every `get`.
    Factory,
    /// Shared factory, invoked once and cached.
    Shared,
    /// A value injected directly with `set`.
    Setter,
    /// Forwards to another registered name.
    Alias(String),
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method => write!(f, "method"),
            Self::Factory => write!(f, "factory"),
            Self::Shared => write!(f, "shared"),
            Self::Setter => write!(f, "setter"),
            Self::Alias(target) => write!(f, "alias -> {target}"),
        }
    }
}
