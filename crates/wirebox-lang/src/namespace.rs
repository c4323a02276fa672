//! Accumulated parameters, services, and aliases of one build.
//!
//! A [`Namespace`] is filled by the [`Interpreter`](crate::interpreter::Interpreter)
//! from one or more scopes. All maps keep first-insertion order; replacing
//! an entry keeps its original slot.

use indexmap::IndexMap;
use wirebox_common::error::Result;
use wirebox_common::types::Value;

use crate::definition::ServiceDefinition;
use crate::import::SourceResolver;
use crate::interpreter::Interpreter;

/// Mutable accumulation target for interpreted scopes.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    parameters: IndexMap<String, Value>,
    services: IndexMap<String, ServiceDefinition>,
    aliases: IndexMap<String, String>,
}

impl Namespace {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lexes, parses, and interprets `source` into a fresh namespace.
    ///
    /// Imports are resolved through `resolver`.
    ///
    /// # Errors
    ///
    /// Returns the first lex, parse, or interpreter error.
    pub fn parse(source: &str, resolver: &dyn SourceResolver) -> Result<Self> {
        let mut namespace = Self::new();
        let scope = crate::parser::parse_source(source)?;
        Interpreter::new(&mut namespace, resolver).handle_scope(scope)?;
        Ok(namespace)
    }

    /// Whether a parameter named `name` exists.
    #[must_use]
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Returns the parameter named `name`.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Inserts or replaces a parameter.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: Value) {
        let _ = self.parameters.insert(name.into(), value);
    }

    /// All parameters in first-insertion order.
    #[must_use]
    pub const fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    /// Whether a service named `name` exists.
    #[must_use]
    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Returns the service definition named `name`.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.get(name)
    }

    /// Inserts or replaces a service definition.
    pub fn set_service(&mut self, name: impl Into<String>, definition: ServiceDefinition) {
        let _ = self.services.insert(name.into(), definition);
    }

    /// Removes a service definition, keeping the order of the rest.
    pub fn remove_service(&mut self, name: &str) -> Option<ServiceDefinition> {
        self.services.shift_remove(name)
    }

    /// All service definitions in first-insertion order.
    #[must_use]
    pub const fn services(&self) -> &IndexMap<String, ServiceDefinition> {
        &self.services
    }

    /// Whether an alias named `name` exists.
    #[must_use]
    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Returns the target of the alias named `name`.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Inserts or replaces an alias.
    pub fn set_alias(&mut self, name: impl Into<String>, target: impl Into<String>) {
        let _ = self.aliases.insert(name.into(), target.into());
    }

    /// Removes an alias, keeping the order of the rest.
    pub fn remove_alias(&mut self, name: &str) -> Option<String> {
        self.aliases.shift_remove(name)
    }

    /// All aliases in first-insertion order.
    #[must_use]
    pub const fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }
}
