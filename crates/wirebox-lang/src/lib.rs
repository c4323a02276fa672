//! # wirebox-lang
//!
//! Front end of the wirebox toolchain.
//!
//! Handles:
//! - **Parser**: Lexing and AST construction for configuration units.
//! - **Definition**: The service definition value objects the rest of the
//!   pipeline consumes.
//! - **Namespace**: Accumulated parameters, services, and aliases.
//! - **Interpreter**: Override rules and import expansion into a namespace.
//! - **Import**: Source resolvers that turn unit names into source text.
//! - **Graph**: Service dependency graph and construction ordering.

pub mod definition;
pub mod graph;
pub mod import;
pub mod interpreter;
pub mod namespace;
pub mod parser;

pub use definition::{Argument, ArgumentKind, ArgumentList, MethodCall, ServiceDefinition};
pub use import::{FileSourceResolver, MemorySourceResolver, SourceResolver};
pub use interpreter::Interpreter;
pub use namespace::Namespace;
