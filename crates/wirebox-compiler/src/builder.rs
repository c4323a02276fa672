//! The container builder.
//!
//! Collects services, parameters, and aliases (directly or from an
//! interpreted [`Namespace`]) and compiles them into a [`CompiledModule`].
//! Every argument is wired at build time: references to services of the
//! same module become direct resolver-unit calls, anything else goes through
//! the container's `get`.

use std::collections::HashSet;

use indexmap::IndexMap;
use wirebox_common::constants::SELF_NAME;
use wirebox_common::error::Result;
use wirebox_common::types::{ModuleName, Value};
use wirebox_lang::{Argument, ArgumentList, Namespace, ServiceDefinition};
use wirebox_runtime::ResolverKind;

use crate::ir::{CallStep, CompiledModule, Construct, Expr, ResolverUnit};
use crate::naming::{MethodNames, validate_service_name};

/// Compiles service definitions into a [`CompiledModule`].
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    module: ModuleName,
    parameters: IndexMap<String, Value>,
    services: IndexMap<String, ServiceDefinition>,
    aliases: IndexMap<String, String>,
    method_names: MethodNames,
}

impl ContainerBuilder {
    /// Creates a builder for the module named `module`.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Builder`](wirebox_common::error::WireboxError::Builder)
    /// if the module name is invalid.
    pub fn new(module: &str) -> Result<Self> {
        Ok(Self {
            module: ModuleName::parse(module)?,
            parameters: IndexMap::new(),
            services: IndexMap::new(),
            aliases: IndexMap::new(),
            method_names: MethodNames::new(),
        })
    }

    /// The target module name.
    #[must_use]
    pub const fn module(&self) -> &ModuleName {
        &self.module
    }

    /// Registers or replaces a service. An alias of the same name is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns a builder error if `name` is not a valid service name.
    pub fn add_service(&mut self, name: &str, definition: ServiceDefinition) -> Result<()> {
        validate_service_name(name)?;
        let _ = self.aliases.shift_remove(name);
        let _ = self.method_names.assign(name);
        let _ = self.services.insert(name.to_owned(), definition);
        Ok(())
    }

    /// Sets a parameter.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let _ = self.parameters.insert(name.into(), value.into());
    }

    /// Registers or replaces an alias. A service of the same name is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns a builder error if `name` is not a valid service name.
    pub fn add_alias(&mut self, name: &str, target: impl Into<String>) -> Result<()> {
        validate_service_name(name)?;
        let _ = self.services.shift_remove(name);
        let _ = self.aliases.insert(name.to_owned(), target.into());
        Ok(())
    }

    /// Adds every parameter, service, and alias of `namespace`.
    ///
    /// # Errors
    ///
    /// Returns a builder error on the first invalid service or alias name.
    pub fn import_namespace(&mut self, namespace: &Namespace) -> Result<()> {
        for (name, value) in namespace.parameters() {
            self.add_parameter(name.clone(), value.clone());
        }
        for (name, definition) in namespace.services() {
            self.add_service(name, definition.clone())?;
        }
        for (name, target) in namespace.aliases() {
            self.add_alias(name, target.clone())?;
        }
        Ok(())
    }

    /// Resolver-method name of a registered service.
    ///
    /// # Errors
    ///
    /// Returns a builder error if `service` was never registered.
    pub fn method_name(&self, service: &str) -> Result<&str> {
        self.method_names.get(service)
    }

    /// Compiles everything registered so far.
    ///
    /// # Errors
    ///
    /// Returns a builder error if a service lost its method name, which
    /// cannot happen through the public API.
    pub fn build(&self) -> Result<CompiledModule> {
        tracing::info!(
            module = %self.module,
            services = self.services.len(),
            aliases = self.aliases.len(),
            "building container module"
        );

        let mut resolver_kinds = IndexMap::new();
        let mut method_names = IndexMap::new();
        let mut units = IndexMap::new();
        let mut metadata: IndexMap<String, IndexMap<String, Vec<Vec<Value>>>> = IndexMap::new();
        let mut service_tags: IndexMap<String, Vec<String>> = IndexMap::new();

        for (name, definition) in &self.services {
            let method = self.method_name(name)?.to_owned();
            let _ = resolver_kinds.insert(name.clone(), ResolverKind::Method);
            let _ = method_names.insert(name.clone(), method.clone());

            for (tag, payloads) in &definition.metadata {
                metadata
                    .entry(tag.clone())
                    .or_default()
                    .entry(name.clone())
                    .or_default()
                    .extend(payloads.iter().cloned());
                service_tags.entry(name.clone()).or_default().push(tag.clone());
            }

            tracing::debug!(
                service = %name,
                method = %method,
                shared = definition.shared,
                "compiling resolver unit"
            );
            let _ = units.insert(method, self.compile_unit(name, definition)?);
        }

        for (name, target) in &self.aliases {
            let _ = resolver_kinds.insert(name.clone(), ResolverKind::Alias(target.clone()));
        }

        Ok(CompiledModule {
            name: self.module.clone(),
            parameters: self.parameters.clone(),
            aliases: self.aliases.clone(),
            resolver_kinds,
            method_names,
            metadata,
            service_tags,
            units,
        })
    }

    fn compile_unit(&self, name: &str, definition: &ServiceDefinition) -> Result<ResolverUnit> {
        let args = self.wire(&definition.arguments)?;
        let construct = match definition.factory_method() {
            Some(method) => Construct::StaticFactory {
                class: definition.class.clone(),
                method: method.to_owned(),
                args,
            },
            None => Construct::New {
                class: definition.class.clone(),
                args,
            },
        };
        let calls = definition
            .method_calls
            .iter()
            .map(|call| {
                Ok(CallStep {
                    method: call.name.clone(),
                    args: self.wire(&call.arguments)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolverUnit {
            service: name.to_owned(),
            shared: definition.shared,
            construct,
            calls,
        })
    }

    fn wire(&self, arguments: &ArgumentList) -> Result<Vec<Expr>> {
        arguments
            .iter()
            .map(|argument| match argument {
                Argument::Dependency(service) => self.wire_dependency(service),
                Argument::Parameter(name) => Ok(Expr::Parameter { name: name.clone() }),
                Argument::Raw(value) => Ok(Expr::Literal {
                    value: value.clone(),
                }),
            })
            .collect()
    }

    fn wire_dependency(&self, service: &str) -> Result<Expr> {
        if service == SELF_NAME {
            return Ok(Expr::SelfRef);
        }
        let Some(target) = self.known_target(service) else {
            return Ok(Expr::Lookup {
                service: service.to_owned(),
            });
        };
        let method = self.method_name(target)?.to_owned();
        let shared = self.services.get(target).is_some_and(|d| d.shared);
        Ok(if shared {
            Expr::SharedInvoke {
                service: target.to_owned(),
                method,
            }
        } else {
            Expr::Invoke { method }
        })
    }

    /// Follows aliases from `name` to a service of this builder.
    fn known_target<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        let mut seen = HashSet::new();
        let mut current = name;
        loop {
            if self.services.contains_key(current) {
                return Some(current);
            }
            if !seen.insert(current) {
                return None;
            }
            current = self.aliases.get(current)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use wirebox_common::error::WireboxError;
    use wirebox_lang::MemorySourceResolver;

    use super::*;

    fn builder() -> ContainerBuilder {
        ContainerBuilder::new("app::di::AppContainer").expect("valid module name")
    }

    fn compile(source: &str) -> CompiledModule {
        let namespace = Namespace::parse(source, &MemorySourceResolver::new()).expect("interpret");
        let mut builder = builder();
        builder.import_namespace(&namespace).expect("import");
        builder.build().expect("build")
    }

    #[test]
    fn invalid_module_name_fails() {
        assert!(matches!(
            ContainerBuilder::new("1App"),
            Err(WireboxError::Builder { .. })
        ));
    }

    #[test]
    fn invalid_service_names_are_rejected() {
        let mut b = builder();
        for bad in [".bad", "1abc", "trailing_"] {
            assert!(b.add_service(bad, ServiceDefinition::new("X")).is_err(), "{bad}");
        }
        b.add_service("good.name_1", ServiceDefinition::new("X"))
            .expect("valid name");
        assert!(b.add_alias("container", "x").is_err());
    }

    #[test]
    fn resolver_kinds_and_method_names() {
        let module =
            compile("@db.host_main: Db\n@database: @db.host_main\ntransient @logger: Logger");
        assert_eq!(module.resolver_kinds["db.host_main"], ResolverKind::Method);
        assert_eq!(module.resolver_kinds["logger"], ResolverKind::Method);
        assert_eq!(
            module.resolver_kinds["database"],
            ResolverKind::Alias("db.host_main".into())
        );
        assert_eq!(module.method_names["db.host_main"], "resolveDbHostMain");
        assert!(module.unit("resolveDbHostMain").expect("unit").shared);
        assert!(!module.unit("resolveLogger").expect("unit").shared);
    }

    #[test]
    fn name_collisions_get_suffixes() {
        let mut b = builder();
        b.add_service("foo.bar", ServiceDefinition::new("A")).expect("add");
        b.add_service("foo_bar", ServiceDefinition::new("B")).expect("add");
        assert_eq!(b.method_name("foo.bar").expect("name"), "resolveFooBar");
        assert_eq!(b.method_name("foo_bar").expect("name"), "resolveFooBar1");
        let module = b.build().expect("build");
        assert_eq!(module.unit("resolveFooBar1").expect("unit").construct.class(), "B");
    }

    #[test]
    fn method_name_of_unregistered_service_fails() {
        assert!(matches!(
            builder().method_name("ghost"),
            Err(WireboxError::Builder { .. })
        ));
    }

    #[test]
    fn arguments_are_wired_by_kind() {
        let module = compile(
            ":db.host: 'localhost'\n\
             transient @logger: Logger\n\
             @cache: Cache\n\
             @store: @cache\n\
             @db: Db(:db.host, @logger, @store, @external, @container, 5)",
        );
        let unit = module.unit("resolveDb").expect("unit");
        assert_eq!(
            unit.construct,
            Construct::New {
                class: "Db".into(),
                args: vec![
                    Expr::Parameter {
                        name: "db.host".into()
                    },
                    Expr::Invoke {
                        method: "resolveLogger".into()
                    },
                    Expr::SharedInvoke {
                        service: "cache".into(),
                        method: "resolveCache".into()
                    },
                    Expr::Lookup {
                        service: "external".into()
                    },
                    Expr::SelfRef,
                    Expr::Literal {
                        value: Value::Int(5)
                    },
                ],
            }
        );
    }

    #[test]
    fn dangling_or_cyclic_aliases_fall_back_to_lookup() {
        let module = compile("@a: @b\n@b: @a\n@svc: Svc(@a, @nowhere)");
        let unit = module.unit("resolveSvc").expect("unit");
        assert_eq!(
            unit.construct.args(),
            [
                Expr::Lookup {
                    service: "a".into()
                },
                Expr::Lookup {
                    service: "nowhere".into()
                },
            ]
        );
    }

    #[test]
    fn factory_tag_selects_static_factory() {
        let module = compile("@clock: Clock('utc')\n  = factory: 'system'");
        assert_eq!(
            module.unit("resolveClock").expect("unit").construct,
            Construct::StaticFactory {
                class: "Clock".into(),
                method: "system".into(),
                args: vec![Expr::Literal {
                    value: Value::from("utc")
                }],
            }
        );
    }

    #[test]
    fn method_calls_keep_order() {
        let module = compile("@db: Db\n  - connect(:dsn)\n  - setTimeout(30)");
        let calls = &module.unit("resolveDb").expect("unit").calls;
        assert_eq!(
            calls.iter().map(|c| c.method.as_str()).collect::<Vec<_>>(),
            vec!["connect", "setTimeout"]
        );
        assert_eq!(calls[0].args, vec![Expr::Parameter { name: "dsn".into() }]);
    }

    #[test]
    fn metadata_tables_are_built_both_ways() {
        let module = compile(
            "@a: A\n  = tag: 'x'\n  = tag: 'y'\n  = listener\n@b: B\n  = tag: 'z'",
        );
        assert_eq!(module.services_tagged("tag"), vec!["a", "b"]);
        assert_eq!(
            module.metadata["tag"]["a"],
            vec![vec![Value::from("x")], vec![Value::from("y")]]
        );
        assert_eq!(module.service_tags["a"], vec!["tag", "listener"]);
        assert_eq!(module.service_tags["b"], vec!["tag"]);
        assert!(module.services_tagged("missing").is_empty());
    }

    #[test]
    fn service_and_alias_replace_each_other() {
        let mut b = builder();
        b.add_service("x", ServiceDefinition::new("X")).expect("add");
        b.add_alias("x", "y").expect("alias");
        let module = b.build().expect("build");
        assert_eq!(module.resolver_kinds["x"], ResolverKind::Alias("y".into()));
        assert!(module.units.is_empty());
    }

    #[test]
    fn module_survives_json() {
        let module = compile(":p: 1.5\n@a: A(:p, {1, 'two'}, null)\n  = tag: true\n@b: @a");
        let json = module.to_json().expect("serialize");
        assert_eq!(CompiledModule::from_json(&json).expect("deserialize"), module);
    }
}
