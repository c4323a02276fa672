//! Abstract Syntax Tree for configuration units.
//!
//! Statements and arguments are closed sum types; consumers match on them
//! exhaustively.

use wirebox_common::types::Value;

/// Root node of one parsed unit: its statements in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeNode {
    /// Statements in source order.
    pub nodes: Vec<Statement>,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `import unit/name`
    Import(ImportNode),
    /// `:name: value`
    Parameter(ParameterDefNode),
    /// `@name: Class(args)` with its method calls and metadata.
    Service(ServiceDefNode),
    /// `@name: @target`
    Alias(AliasDefNode),
}

/// An `import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportNode {
    /// Name of the unit to import, as written.
    pub path: String,
}

/// A parameter definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefNode {
    /// Parameter name.
    pub name: String,
    /// Literal value.
    pub value: Value,
    /// Whether the definition carried the `override` modifier.
    pub is_override: bool,
}

/// A service definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDefNode {
    /// Service name.
    pub name: String,
    /// Class or target identifier to construct.
    pub class_name: String,
    /// Constructor arguments.
    pub arguments: Vec<ArgumentNode>,
    /// Whether the definition carried the `override` modifier.
    pub is_override: bool,
    /// `false` when the definition carried the `transient` modifier.
    pub is_shared: bool,
    /// Post-construction method calls in declaration order.
    pub method_calls: Vec<MethodCallNode>,
    /// Metadata declarations in declaration order.
    pub metadata: Vec<MetadataNode>,
}

/// An alias definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDefNode {
    /// Alias name.
    pub name: String,
    /// Service the alias forwards to.
    pub target: String,
    /// Whether the definition carried the `override` modifier.
    pub is_override: bool,
}

/// `- method(args)` following a service definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallNode {
    /// Method name.
    pub name: String,
    /// Call arguments.
    pub arguments: Vec<ArgumentNode>,
}

/// `= tag: payload, ...` following a service definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataNode {
    /// Tag name.
    pub tag: String,
    /// Payload values, possibly empty.
    pub payload: Vec<Value>,
}

/// One argument of a constructor or method call.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentNode {
    /// A literal value.
    ValueRef(Value),
    /// `:name` reference to a parameter.
    ParameterRef(String),
    /// `@name` reference to a service.
    ServiceRef(String),
}
