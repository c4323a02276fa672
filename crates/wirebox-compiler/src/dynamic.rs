//! Dynamic binding of a namespace onto a plain container.
//!
//! The interpreted alternative to compiling: every service definition is
//! bound as a [`DefinitionFactory`] and arguments are resolved through
//! `get` on each construction. Resolution order matches the compiled
//! resolver units, so both paths build the same instances.

use wirebox_common::error::Result;
use wirebox_lang::{Argument, ArgumentList, Namespace, ServiceDefinition};
use wirebox_runtime::{Arg, ClassRegistry, Container, Factory, Instance, ServiceFactory};

use crate::module::parameter;
use crate::naming::validate_service_name;

/// Builds one service from its definition on every call.
#[derive(Debug, Clone)]
pub struct DefinitionFactory {
    service: String,
    definition: ServiceDefinition,
    classes: ClassRegistry,
}

impl DefinitionFactory {
    /// Creates a factory for `service`.
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        definition: ServiceDefinition,
        classes: ClassRegistry,
    ) -> Self {
        Self {
            service: service.into(),
            definition,
            classes,
        }
    }

    fn arguments(container: &Container, arguments: &ArgumentList) -> Result<Vec<Arg>> {
        arguments
            .iter()
            .map(|argument| {
                Ok(match argument {
                    Argument::Dependency(name) => Arg::Service(container.get(name)?),
                    Argument::Parameter(name) => Arg::Value(parameter(container, name)?),
                    Argument::Raw(value) => Arg::Value(value.clone()),
                })
            })
            .collect()
    }
}

impl ServiceFactory for DefinitionFactory {
    fn create(&self, container: &Container) -> Result<Instance> {
        let args = Self::arguments(container, &self.definition.arguments)?;
        let mut pending = self.classes.construct(
            &self.service,
            &self.definition.class,
            self.definition.factory_method(),
            args,
        )?;
        for call in &self.definition.method_calls {
            let args = Self::arguments(container, &call.arguments)?;
            pending.call(&call.name, args)?;
        }
        Ok(pending.finish())
    }
}

/// Binds every parameter, service, and alias of `namespace` on `container`.
///
/// # Errors
///
/// Returns a builder error for an invalid service or alias name.
pub fn bind_namespace(
    container: &Container,
    namespace: &Namespace,
    classes: &ClassRegistry,
) -> Result<()> {
    tracing::info!(
        services = namespace.services().len(),
        aliases = namespace.aliases().len(),
        "binding namespace dynamically"
    );
    for (name, value) in namespace.parameters() {
        container.set_parameter(name.clone(), value.clone());
    }
    for (name, definition) in namespace.services() {
        validate_service_name(name)?;
        let factory = DefinitionFactory::new(name.clone(), definition.clone(), classes.clone());
        container.bind(name.clone(), Factory::object(factory), definition.shared)?;
    }
    for (name, target) in namespace.aliases() {
        validate_service_name(name)?;
        container.alias(name.clone(), target.clone())?;
    }
    Ok(())
}
