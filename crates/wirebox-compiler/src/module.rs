//! Loading a compiled module into a runtime container.
//!
//! The loaded container dispatches every `Method` kind to
//! [`ModuleUnits`], which evaluates the module's resolver units against the
//! host's [`ClassRegistry`].

use std::sync::Arc;

use wirebox_common::error::{Result, WireboxError};
use wirebox_runtime::{Arg, ClassRegistry, CompiledUnits, Container, Instance, ResolverKind};

use crate::ir::{CompiledModule, Construct, Expr, ResolverUnit};

impl CompiledModule {
    /// Creates a container running this module.
    ///
    /// # Errors
    ///
    /// Returns an error if a table entry cannot be registered, e.g. a
    /// resolver kind naming the reserved name.
    pub fn load(self, classes: ClassRegistry) -> Result<Container> {
        tracing::info!(module = %self.name, units = self.units.len(), "loading compiled module");
        let module = Arc::new(self);
        let container = Container::with_units(Arc::new(ModuleUnits {
            module: Arc::clone(&module),
            classes,
        }));

        for (name, value) in &module.parameters {
            container.set_parameter(name.clone(), value.clone());
        }
        for (name, kind) in &module.resolver_kinds {
            match kind {
                ResolverKind::Alias(target) => container.alias(name.clone(), target.clone())?,
                _ => {
                    let method = module.method_names.get(name).ok_or_else(|| {
                        WireboxError::Container {
                            message: format!("service \"{name}\" has no resolver method"),
                        }
                    })?;
                    container.register_method(name.clone(), method.clone())?;
                }
            }
        }
        Ok(container)
    }
}

/// Resolver units of one loaded module.
pub struct ModuleUnits {
    module: Arc<CompiledModule>,
    classes: ClassRegistry,
}

impl ModuleUnits {
    fn run(&self, container: &Container, unit: &ResolverUnit) -> Result<Instance> {
        if unit.shared {
            if let Some(instance) = container.resolved_instance(&unit.service) {
                return Ok(instance);
            }
        }

        let (factory, args) = match &unit.construct {
            Construct::New { args, .. } => (None, args),
            Construct::StaticFactory { method, args, .. } => (Some(method.as_str()), args),
        };
        let args = self.evaluate_all(container, args)?;
        let mut pending =
            self.classes
                .construct(&unit.service, unit.construct.class(), factory, args)?;
        for call in &unit.calls {
            let args = self.evaluate_all(container, &call.args)?;
            pending.call(&call.method, args)?;
        }

        let instance = pending.finish();
        Ok(if unit.shared {
            container.cache_instance(&unit.service, instance)
        } else {
            instance
        })
    }

    fn evaluate_all(&self, container: &Container, exprs: &[Expr]) -> Result<Vec<Arg>> {
        exprs.iter().map(|e| self.evaluate(container, e)).collect()
    }

    fn evaluate(&self, container: &Container, expr: &Expr) -> Result<Arg> {
        Ok(match expr {
            Expr::SelfRef => Arg::Service(Arc::new(container.clone())),
            Expr::SharedInvoke { service, method } => Arg::Service(
                match container.resolved_instance(service) {
                    Some(instance) => instance,
                    None => self.call(container, method)?,
                },
            ),
            Expr::Invoke { method } => Arg::Service(self.call(container, method)?),
            Expr::Lookup { service } => Arg::Service(container.get(service)?),
            Expr::Parameter { name } => Arg::Value(parameter(container, name)?),
            Expr::Literal { value } => Arg::Value(value.clone()),
        })
    }
}

impl CompiledUnits for ModuleUnits {
    fn call(&self, container: &Container, method: &str) -> Result<Instance> {
        let unit = self.module.unit(method).ok_or_else(|| {
            WireboxError::unknown_service(method, "no resolver unit with this name")
        })?;
        self.run(container, unit)
    }
}

/// Parameter lookup shared by compiled and dynamic resolution.
pub(crate) fn parameter(
    container: &Container,
    name: &str,
) -> Result<wirebox_common::types::Value> {
    container
        .parameter(name)
        .ok_or_else(|| WireboxError::Container {
            message: format!("parameter \"{name}\" is not defined"),
        })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wirebox_common::types::Value;
    use wirebox_lang::{MemorySourceResolver, Namespace};
    use wirebox_runtime::Class;

    use super::*;
    use crate::builder::ContainerBuilder;

    static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Logger {
        id: usize,
    }

    #[derive(Debug)]
    struct Database {
        host: String,
        logger: Arc<Logger>,
        timeout: Option<i64>,
    }

    fn classes() -> ClassRegistry {
        ClassRegistry::new()
            .with(
                "app.Logger",
                Class::new("app.Logger").constructor(|_| {
                    Ok(Logger {
                        id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
                    })
                }),
            )
            .with(
                "app.Database",
                Class::new("app.Database")
                    .constructor(|args: Vec<Arg>| {
                        Ok(Database {
                            host: args
                                .first()
                                .and_then(Arg::as_str)
                                .unwrap_or_default()
                                .to_owned(),
                            logger: args
                                .get(1)
                                .and_then(Arg::service::<Logger>)
                                .ok_or_else(|| WireboxError::Factory {
                                    name: "app.Database".into(),
                                    message: "missing logger".into(),
                                })?,
                            timeout: None,
                        })
                    })
                    .method("setTimeout", |db: &mut Database, args| {
                        db.timeout = args.first().and_then(Arg::as_int);
                        Ok(())
                    }),
            )
    }

    fn load(source: &str) -> Container {
        let namespace = Namespace::parse(source, &MemorySourceResolver::new()).expect("interpret");
        let mut builder = ContainerBuilder::new("test::Container").expect("module name");
        builder.import_namespace(&namespace).expect("import");
        builder.build().expect("build").load(classes()).expect("load")
    }

    const APP: &str = ":db.host: 'localhost'\n\
                       transient @logger: app.Logger\n\
                       @db: app.Database(:db.host, @logger)\n  - setTimeout(30)\n\
                       @database: @db";

    #[test]
    fn shared_service_resolves_once() {
        let container = load(APP);
        assert!(!container.is_resolved("db"));
        let first = container.get("db").expect("db");
        let second = container.get("db").expect("db");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(container.is_resolved("db"));

        let db = first.downcast::<Database>().expect("Database");
        assert_eq!(db.host, "localhost");
        assert_eq!(db.timeout, Some(30));
    }

    #[test]
    fn unshared_service_is_fresh_each_time() {
        let container = load(APP);
        let a = container.get("logger").expect("logger").downcast::<Logger>().expect("Logger");
        let b = container.get("logger").expect("logger").downcast::<Logger>().expect("Logger");
        assert_ne!(a.id, b.id);
        assert!(!container.is_resolved("logger"));
    }

    #[test]
    fn alias_resolves_to_the_same_instance() {
        let container = load(APP);
        let via_alias = container.get("database").expect("alias");
        assert!(Arc::ptr_eq(&via_alias, &container.get("db").expect("db")));
    }

    #[test]
    fn release_rebuilds_shared_service() {
        let container = load(APP);
        let first = container.get("db").expect("db");
        assert!(container.release("db"));
        let second = container.get("db").expect("db");
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn parameters_are_loaded_and_overridable() {
        let container = load(APP);
        assert_eq!(container.get_parameter("db.host", Value::Null), Value::from("localhost"));
        container.set_parameter("db.host", "remote");
        let db = container.get("db").expect("db").downcast::<Database>().expect("Database");
        assert_eq!(db.host, "remote");
    }

    #[test]
    fn missing_parameter_fails_resolution() {
        let container = load("@db: app.Database(:nope, @logger)\ntransient @logger: app.Logger");
        let err = container.get("db").expect_err("should fail");
        assert!(err.to_string().contains("nope"), "got: {err}");
    }

    #[test]
    fn unknown_class_is_invalid_service() {
        let container = load("@thing: app.Missing");
        assert!(matches!(
            container.get("thing"),
            Err(WireboxError::InvalidService { .. })
        ));
    }

    #[test]
    fn lookups_reach_dynamically_bound_services() {
        let container = load("@db: app.Database('h', @ext.logger)");
        assert!(container.get("db").is_err());
        container
            .bind_shared_factory("ext.logger", |_| Ok(Arc::new(Logger { id: 999 }) as Instance))
            .expect("bind");
        let db = container.get("db").expect("db").downcast::<Database>().expect("Database");
        assert_eq!(db.logger.id, 999);
    }

    #[test]
    fn self_reference_is_the_loaded_container() {
        struct Holder {
            container: Arc<Container>,
        }

        let registry = classes().with(
            "app.Holder",
            Class::new("app.Holder").constructor(|args: Vec<Arg>| {
                let container = args.first().and_then(Arg::service::<Container>).ok_or_else(|| {
                    WireboxError::Factory {
                        name: "app.Holder".into(),
                        message: "expected the container".into(),
                    }
                })?;
                Ok(Holder { container })
            }),
        );
        let namespace =
            Namespace::parse("@svc: app.Holder(@container)", &MemorySourceResolver::new())
                .expect("interpret");
        let mut builder = ContainerBuilder::new("test::Holder").expect("module name");
        builder.import_namespace(&namespace).expect("import");
        let container = builder.build().expect("build").load(registry).expect("load");

        let holder = container.get("svc").expect("svc").downcast::<Holder>().expect("Holder");
        assert!(holder.container.same(&container));
    }
}
