//! Unified error types for the wirebox workspace.
//!
//! Every pipeline stage reports through [`WireboxError`]; the variant tells
//! the caller which stage failed. All errors are terminal at the point they
//! are raised.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum WireboxError {
    /// The lexer met a malformed token.
    #[error("lex error at {line}:{column}: {message}")]
    Lex {
        /// 1-based line of the offending character.
        line: usize,
        /// 1-based column of the offending character.
        column: usize,
        /// What went wrong.
        message: String,
    },

    /// The token stream does not match the grammar.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        /// 1-based line of the offending token.
        line: usize,
        /// 1-based column of the offending token.
        column: usize,
        /// What went wrong.
        message: String,
    },

    /// A scope could not be applied to a namespace.
    #[error("interpreter error: {message}")]
    Interpreter {
        /// Description of the semantic failure.
        message: String,
    },

    /// The container builder rejected its input.
    #[error("builder error: {message}")]
    Builder {
        /// Description of the invalid input.
        message: String,
    },

    /// A runtime lookup hit an unregistered or misconfigured name.
    #[error("unknown service \"{name}\": {reason}")]
    UnknownService {
        /// Requested service name.
        name: String,
        /// Why the lookup failed.
        reason: String,
    },

    /// A registered factory cannot produce the service.
    #[error("invalid service \"{name}\": {message}")]
    InvalidService {
        /// Service name.
        name: String,
        /// Description of the problem.
        message: String,
    },

    /// An operation on the container itself was refused.
    #[error("container error: {message}")]
    Container {
        /// Description of the refused operation.
        message: String,
    },

    /// A host-provided factory or class failed while building an instance.
    #[error("factory for \"{name}\" failed: {message}")]
    Factory {
        /// Service or class being built.
        name: String,
        /// Failure reported by the host code.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl WireboxError {
    /// Shorthand for an [`WireboxError::Interpreter`] error.
    pub fn interpreter(message: impl Into<String>) -> Self {
        Self::Interpreter {
            message: message.into(),
        }
    }

    /// Shorthand for a [`WireboxError::Builder`] error.
    pub fn builder(message: impl Into<String>) -> Self {
        Self::Builder {
            message: message.into(),
        }
    }

    /// Shorthand for an [`WireboxError::UnknownService`] error.
    pub fn unknown_service(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnknownService {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, WireboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positioned_errors_render_location() {
        let err = WireboxError::Parse {
            line: 3,
            column: 7,
            message: "expected `:`".into(),
        };
        assert_eq!(err.to_string(), "parse error at 3:7: expected `:`");
    }

    #[test]
    fn unknown_service_names_the_service() {
        let err = WireboxError::unknown_service("mailer", "nothing is bound");
        let msg = err.to_string();
        assert!(msg.contains("\"mailer\""), "got: {msg}");
        assert!(msg.contains("nothing is bound"), "got: {msg}");
    }
}
