//! One-call construction of containers from configuration units.

use std::path::Path;

use wirebox_common::config::BuildConfig;
use wirebox_common::error::Result;
use wirebox_compiler::{CompiledModule, ContainerBuilder, bind_namespace};
use wirebox_lang::graph::DependencyGraph;
use wirebox_lang::{FileSourceResolver, Interpreter, Namespace, SourceResolver};
use wirebox_runtime::{ClassRegistry, Container};

/// Runs the whole pipeline: resolve, interpret, compile, load.
pub struct ContainerFactory {
    resolver: Box<dyn SourceResolver>,
    classes: ClassRegistry,
    module: String,
}

impl ContainerFactory {
    /// Creates a factory that reads units through `resolver` and builds
    /// services from `classes`.
    #[must_use]
    pub fn new<R: SourceResolver + 'static>(resolver: R, classes: ClassRegistry) -> Self {
        Self {
            resolver: Box::new(resolver),
            classes,
            module: wirebox_common::constants::DEFAULT_MODULE_NAME.to_owned(),
        }
    }

    /// Creates a factory reading units from the directory and extension of
    /// `config`, compiling into the module it names.
    #[must_use]
    pub fn from_config(config: &BuildConfig, classes: ClassRegistry) -> Self {
        let resolver = FileSourceResolver::new(config.source_root.clone())
            .with_extension(&config.extension);
        Self::new(resolver, classes).module(config.module.clone())
    }

    /// Creates a factory reading units below `root`.
    #[must_use]
    pub fn from_dir(root: &Path, classes: ClassRegistry) -> Self {
        Self::new(FileSourceResolver::new(root.to_path_buf()), classes)
    }

    /// Sets the name of compiled modules.
    #[must_use]
    pub fn module(mut self, name: impl Into<String>) -> Self {
        self.module = name.into();
        self
    }

    /// Interprets `unit` and everything it imports.
    ///
    /// # Errors
    ///
    /// Returns the first lex, parse, or interpreter error.
    pub fn namespace(&self, unit: &str) -> Result<Namespace> {
        let mut namespace = Namespace::new();
        Interpreter::new(&mut namespace, self.resolver.as_ref()).interpret_unit(unit)?;
        Ok(namespace)
    }

    /// Construction order of the services of `unit`.
    ///
    /// # Errors
    ///
    /// Returns an interpretation error, or a builder error on a dependency
    /// cycle.
    pub fn plan(&self, unit: &str) -> Result<Vec<String>> {
        DependencyGraph::from_namespace(&self.namespace(unit)?).resolve_order()
    }

    /// Compiles `unit` into a module.
    ///
    /// # Errors
    ///
    /// Returns an interpretation or builder error.
    pub fn compile(&self, unit: &str) -> Result<CompiledModule> {
        let namespace = self.namespace(unit)?;
        let mut builder = ContainerBuilder::new(&self.module)?;
        builder.import_namespace(&namespace)?;
        builder.build()
    }

    /// Compiles `unit` and loads it into a fresh container.
    ///
    /// # Errors
    ///
    /// Returns an interpretation, builder, or load error.
    pub fn create(&self, unit: &str) -> Result<Container> {
        self.compile(unit)?.load(self.classes.clone())
    }

    /// Binds `unit` onto a fresh container without compiling it.
    ///
    /// # Errors
    ///
    /// Returns an interpretation error or an invalid service name.
    pub fn create_dynamic(&self, unit: &str) -> Result<Container> {
        let namespace = self.namespace(unit)?;
        let container = Container::new();
        bind_namespace(&container, &namespace, &self.classes)?;
        Ok(container)
    }
}

impl std::fmt::Debug for ContainerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerFactory")
            .field("classes", &self.classes)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wirebox_common::error::WireboxError;
    use wirebox_lang::MemorySourceResolver;
    use wirebox_runtime::Class;

    use super::*;

    struct Greeter {
        greeting: String,
    }

    fn factory(units: MemorySourceResolver) -> ContainerFactory {
        let classes = ClassRegistry::new().with(
            "Greeter",
            Class::new("Greeter").constructor(|args: Vec<wirebox_runtime::Arg>| {
                Ok(Greeter {
                    greeting: args
                        .first()
                        .and_then(wirebox_runtime::Arg::as_str)
                        .unwrap_or("hi")
                        .to_owned(),
                })
            }),
        );
        ContainerFactory::new(units, classes).module("sdk::Test")
    }

    #[test]
    fn create_and_create_dynamic_agree() {
        let units =
            MemorySourceResolver::new().with_unit("app", ":g: 'hello'\n@greeter: Greeter(:g)");
        let f = factory(units);
        for container in [
            f.create("app").expect("create"),
            f.create_dynamic("app").expect("dynamic"),
        ] {
            let greeter = container
                .get("greeter")
                .expect("get")
                .downcast::<Greeter>()
                .expect("Greeter");
            assert_eq!(greeter.greeting, "hello");
            assert!(Arc::ptr_eq(
                &container.get("greeter").expect("get"),
                &container.get("greeter").expect("get")
            ));
        }
    }

    #[test]
    fn compile_uses_the_configured_module_name() {
        let units = MemorySourceResolver::new().with_unit("app", "@greeter: Greeter");
        let module = factory(units).compile("app").expect("compile");
        assert_eq!(module.name.to_string(), "sdk::Test");
    }

    #[test]
    fn invalid_module_name_fails_compile() {
        let units = MemorySourceResolver::new().with_unit("app", "@greeter: Greeter");
        let err = factory(units).module("9bad").compile("app").expect_err("should fail");
        assert!(matches!(err, WireboxError::Builder { .. }));
    }

    #[test]
    fn plan_orders_dependencies_first() {
        let units = MemorySourceResolver::new().with_unit("app", "@a: A(@b)\n@b: B");
        assert_eq!(factory(units).plan("app").expect("plan"), vec!["b", "a"]);
    }

    #[test]
    fn missing_entry_unit_fails() {
        let err = factory(MemorySourceResolver::new())
            .create("app")
            .expect_err("should fail");
        assert!(matches!(err, WireboxError::Interpreter { .. }));
    }
}
