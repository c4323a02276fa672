//! Semantic interpretation of parsed scopes into a [`Namespace`].
//!
//! Applies the override rules (a name may only be redefined when the later
//! definition carries `override`), expands imports recursively into the same
//! namespace, and turns AST service nodes into [`ServiceDefinition`]s.

use wirebox_common::constants::SELF_NAME;
use wirebox_common::error::{Result, WireboxError};

use crate::definition::{Argument, ArgumentList, MethodCall, ServiceDefinition};
use crate::import::SourceResolver;
use crate::namespace::Namespace;
use crate::parser::ast::{
    AliasDefNode, ArgumentNode, ImportNode, ParameterDefNode, ScopeNode, ServiceDefNode,
    Statement,
};

/// Walks scopes and applies them to a namespace.
///
/// The only state besides the namespace is the chain of units currently
/// being imported, used to reject import cycles.
pub struct Interpreter<'a> {
    namespace: &'a mut Namespace,
    resolver: &'a dyn SourceResolver,
    chain: Vec<String>,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter that writes into `namespace` and resolves
    /// imports through `resolver`.
    pub fn new(namespace: &'a mut Namespace, resolver: &'a dyn SourceResolver) -> Self {
        Self {
            namespace,
            resolver,
            chain: Vec::new(),
        }
    }

    /// Resolves, parses, and interprets the unit named `unit`, as if it had
    /// been imported.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while loading or applying the unit.
    pub fn interpret_unit(&mut self, unit: &str) -> Result<()> {
        self.handle_import(&ImportNode {
            path: unit.to_owned(),
        })
    }

    /// Applies every statement of `scope` in order.
    ///
    /// # Errors
    ///
    /// Returns the first interpreter error. The namespace must be discarded
    /// afterwards; it may hold part of the scope.
    pub fn handle_scope(&mut self, scope: ScopeNode) -> Result<()> {
        for node in scope.nodes {
            match node {
                Statement::Import(import) => self.handle_import(&import)?,
                Statement::Parameter(parameter) => self.handle_parameter(parameter)?,
                Statement::Service(service) => self.handle_service(service)?,
                Statement::Alias(alias) => self.handle_alias(alias)?,
            }
        }
        Ok(())
    }

    fn handle_import(&mut self, node: &ImportNode) -> Result<()> {
        let unit = node.path.trim();
        if unit.is_empty() {
            return Err(WireboxError::interpreter("import path cannot be empty"));
        }
        if self.chain.iter().any(|u| u == unit) {
            let mut cycle = self.chain.clone();
            cycle.push(unit.to_owned());
            return Err(WireboxError::interpreter(format!(
                "import cycle detected: {}",
                cycle.join(" -> ")
            )));
        }

        tracing::info!(unit, depth = self.chain.len(), "importing unit");
        let source = self.resolver.resolve(unit).map_err(|e| {
            WireboxError::interpreter(format!("could not import \"{unit}\": {e}"))
        })?;
        let scope = crate::parser::parse_source(&source).map_err(|e| in_unit(e, unit))?;

        self.chain.push(unit.to_owned());
        self.handle_scope(scope)?;
        let _ = self.chain.pop();
        Ok(())
    }

    fn handle_parameter(&mut self, node: ParameterDefNode) -> Result<()> {
        if self.namespace.has_parameter(&node.name) && !node.is_override {
            return Err(WireboxError::interpreter(format!(
                "parameter \"{}\" is already defined, prefix the definition with `override` to replace it",
                node.name
            )));
        }
        tracing::debug!(
            parameter = %node.name,
            is_override = node.is_override,
            "defining parameter"
        );
        self.namespace.set_parameter(node.name, node.value);
        Ok(())
    }

    fn handle_service(&mut self, node: ServiceDefNode) -> Result<()> {
        self.check_service_name(&node.name, node.is_override)?;
        tracing::debug!(service = %node.name, class = %node.class_name, "defining service");

        let mut definition = ServiceDefinition::new(node.class_name)
            .with_arguments(convert_arguments(node.arguments));
        definition.shared = node.is_shared;
        definition.method_calls = node
            .method_calls
            .into_iter()
            .map(|call| MethodCall {
                name: call.name,
                arguments: convert_arguments(call.arguments),
            })
            .collect();
        for meta in node.metadata {
            definition.add_metadata(meta.tag, meta.payload);
        }

        let _ = self.namespace.remove_alias(&node.name);
        self.namespace.set_service(node.name, definition);
        Ok(())
    }

    fn handle_alias(&mut self, node: AliasDefNode) -> Result<()> {
        self.check_service_name(&node.name, node.is_override)?;
        tracing::debug!(alias = %node.name, target = %node.target, "defining alias");

        let _ = self.namespace.remove_service(&node.name);
        self.namespace.set_alias(node.name, node.target);
        Ok(())
    }

    /// Services and aliases share one name space.
    fn check_service_name(&self, name: &str, is_override: bool) -> Result<()> {
        if name == SELF_NAME {
            return Err(WireboxError::interpreter(format!(
                "\"{SELF_NAME}\" is reserved and cannot be defined"
            )));
        }
        let exists = self.namespace.has_service(name) || self.namespace.has_alias(name);
        if exists && !is_override {
            return Err(WireboxError::interpreter(format!(
                "service \"{name}\" is already defined, prefix the definition with `override` to replace it"
            )));
        }
        Ok(())
    }
}

fn convert_arguments(nodes: Vec<ArgumentNode>) -> ArgumentList {
    nodes
        .into_iter()
        .map(|node| match node {
            ArgumentNode::ServiceRef(name) => Argument::Dependency(name),
            ArgumentNode::ParameterRef(name) => Argument::Parameter(name),
            ArgumentNode::ValueRef(value) => Argument::Raw(value),
        })
        .collect()
}

/// Tags a lex or parse error with the unit it came from.
fn in_unit(err: WireboxError, unit: &str) -> WireboxError {
    match err {
        WireboxError::Lex {
            line,
            column,
            message,
        } => WireboxError::Lex {
            line,
            column,
            message: format!("{message} (in unit \"{unit}\")"),
        },
        WireboxError::Parse {
            line,
            column,
            message,
        } => WireboxError::Parse {
            line,
            column,
            message: format!("{message} (in unit \"{unit}\")"),
        },
        other => other,
    }
}
