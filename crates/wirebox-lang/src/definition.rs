//! Service definition value objects.
//!
//! A [`ServiceDefinition`] describes how to build one service: which class to
//! construct, with which arguments, which methods to call afterwards, and
//! which metadata tags it carries. Definitions are produced by the
//! interpreter or registered directly through the builder API.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wirebox_common::constants::FACTORY_TAG;
use wirebox_common::types::Value;

/// How an argument is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgumentKind {
    /// Another service, resolved by name.
    Dependency,
    /// A parameter, looked up by name.
    Parameter,
    /// A literal passed through unchanged.
    Raw,
}

/// One positional argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    /// Name of a service.
    Dependency(String),
    /// Name of a parameter.
    Parameter(String),
    /// Literal value.
    Raw(Value),
}

impl Argument {
    /// Returns how this argument is wired.
    #[must_use]
    pub const fn kind(&self) -> ArgumentKind {
        match self {
            Self::Dependency(_) => ArgumentKind::Dependency,
            Self::Parameter(_) => ArgumentKind::Parameter,
            Self::Raw(_) => ArgumentKind::Raw,
        }
    }
}

/// Ordered arguments; position maps to the constructor or method parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentList(Vec<Argument>);

impl ArgumentList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an argument.
    pub fn push(&mut self, argument: Argument) {
        self.0.push(argument);
    }

    /// Appends a service dependency.
    #[must_use]
    pub fn dependency(mut self, name: impl Into<String>) -> Self {
        self.0.push(Argument::Dependency(name.into()));
        self
    }

    /// Appends a parameter reference.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        self.0.push(Argument::Parameter(name.into()));
        self
    }

    /// Appends a raw literal.
    #[must_use]
    pub fn raw(mut self, value: impl Into<Value>) -> Self {
        self.0.push(Argument::Raw(value.into()));
        self
    }

    /// Iterates the arguments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.0.iter()
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Argument> for ArgumentList {
    fn from_iter<T: IntoIterator<Item = Argument>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ArgumentList {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A method invoked on a freshly constructed instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name.
    pub name: String,
    /// Call arguments.
    pub arguments: ArgumentList,
}

/// Everything needed to build one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Class or target identifier.
    pub class: String,
    /// Constructor arguments.
    pub arguments: ArgumentList,
    /// Post-construction calls in declaration order.
    pub method_calls: Vec<MethodCall>,
    /// Tag to payloads; every declaration of a tag appends one payload list.
    pub metadata: IndexMap<String, Vec<Vec<Value>>>,
    /// Whether a container builds the service once and caches it.
    pub shared: bool,
}

impl ServiceDefinition {
    /// Creates a shared definition for `class` with no arguments.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            arguments: ArgumentList::new(),
            method_calls: Vec::new(),
            metadata: IndexMap::new(),
            shared: true,
        }
    }

    /// Replaces the constructor arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: ArgumentList) -> Self {
        self.arguments = arguments;
        self
    }

    /// Appends a method call.
    #[must_use]
    pub fn with_call(mut self, name: impl Into<String>, arguments: ArgumentList) -> Self {
        self.method_calls.push(MethodCall {
            name: name.into(),
            arguments,
        });
        self
    }

    /// Appends a metadata payload under `tag`.
    #[must_use]
    pub fn with_metadata(mut self, tag: impl Into<String>, payload: Vec<Value>) -> Self {
        self.add_metadata(tag, payload);
        self
    }

    /// Marks the definition as unshared: every resolution builds a new
    /// instance.
    #[must_use]
    pub const fn unshared(mut self) -> Self {
        self.shared = false;
        self
    }

    /// Appends a metadata payload under `tag`.
    pub fn add_metadata(&mut self, tag: impl Into<String>, payload: Vec<Value>) {
        self.metadata.entry(tag.into()).or_default().push(payload);
    }

    /// Name of the static factory method from the `factory` tag, if any.
    /// The last declaration wins.
    #[must_use]
    pub fn factory_method(&self) -> Option<&str> {
        self.metadata
            .get(FACTORY_TAG)
            .and_then(|payloads| payloads.last())
            .and_then(|payload| payload.first())
            .and_then(Value::as_str)
    }

    /// Names of all services this definition depends on, across the
    /// constructor and every method call, in order of appearance.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.arguments
            .iter()
            .chain(self.method_calls.iter().flat_map(|c| c.arguments.iter()))
            .filter_map(|a| match a {
                Argument::Dependency(name) => Some(name.as_str()),
                Argument::Parameter(_) | Argument::Raw(_) => None,
            })
    }
}
