//! Compiled module intermediate representation.
//!
//! A [`CompiledModule`] is the complete output of the container builder:
//! lookup tables plus one [`ResolverUnit`] per service. Argument wiring is
//! decided at build time and stored as [`Expr`] trees, so loading a module
//! never consults a service definition again.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wirebox_common::types::{ModuleName, Value};
use wirebox_runtime::ResolverKind;

/// How one argument value is produced at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    /// The container itself.
    SelfRef,
    /// A shared service of this module: its cached instance, or a call to
    /// its resolver unit.
    SharedInvoke {
        /// Service whose cache is checked.
        service: String,
        /// Resolver unit to run on a cache miss.
        method: String,
    },
    /// An unshared service of this module, built by its resolver unit.
    Invoke {
        /// Resolver unit to run.
        method: String,
    },
    /// A service unknown at build time, resolved through `get`.
    Lookup {
        /// Name passed to `get`.
        service: String,
    },
    /// A container parameter.
    Parameter {
        /// Parameter name.
        name: String,
    },
    /// A literal embedded at build time.
    Literal {
        /// The literal.
        value: Value,
    },
}

/// How a resolver unit creates its instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Construct {
    /// Plain construction of `class`.
    New {
        /// Class identifier.
        class: String,
        /// Constructor arguments.
        args: Vec<Expr>,
    },
    /// A static factory method of `class`.
    StaticFactory {
        /// Class identifier.
        class: String,
        /// Factory method name.
        method: String,
        /// Factory arguments.
        args: Vec<Expr>,
    },
}

impl Construct {
    /// The class identifier being built.
    #[must_use]
    pub fn class(&self) -> &str {
        match self {
            Self::New { class, .. } | Self::StaticFactory { class, .. } => class,
        }
    }

    /// The construction arguments.
    #[must_use]
    pub fn args(&self) -> &[Expr] {
        match self {
            Self::New { args, .. } | Self::StaticFactory { args, .. } => args,
        }
    }
}

/// A method call made on a freshly constructed instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallStep {
    /// Method name on the instance.
    pub method: String,
    /// Call arguments.
    pub args: Vec<Expr>,
}

/// Everything needed to produce one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverUnit {
    /// Service this unit resolves.
    pub service: String,
    /// Whether the result is cached in the container.
    pub shared: bool,
    /// Construction step.
    pub construct: Construct,
    /// Post-construction calls, in order.
    pub calls: Vec<CallStep>,
}

/// The compiled form of a set of services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledModule {
    /// Hierarchical module name.
    pub name: ModuleName,
    /// Parameter table.
    pub parameters: IndexMap<String, Value>,
    /// Alias to target.
    pub aliases: IndexMap<String, String>,
    /// How each registered name is resolved.
    pub resolver_kinds: IndexMap<String, ResolverKind>,
    /// Service to resolver-unit name.
    pub method_names: IndexMap<String, String>,
    /// Tag to service to payloads.
    pub metadata: IndexMap<String, IndexMap<String, Vec<Vec<Value>>>>,
    /// Service to the tags it carries.
    pub service_tags: IndexMap<String, Vec<String>>,
    /// Resolver units keyed by method name.
    pub units: IndexMap<String, ResolverUnit>,
}

impl CompiledModule {
    /// The resolver unit registered as `method`.
    #[must_use]
    pub fn unit(&self, method: &str) -> Option<&ResolverUnit> {
        self.units.get(method)
    }

    /// Names of the services tagged with `tag`, in registration order.
    #[must_use]
    pub fn services_tagged(&self, tag: &str) -> Vec<&str> {
        self.metadata
            .get(tag)
            .map(|services| services.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Serializes the module as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> wirebox_common::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a module back from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a serialized module.
    pub fn from_json(json: &str) -> wirebox_common::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
