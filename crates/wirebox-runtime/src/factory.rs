//! Factories bound to service names.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use wirebox_common::error::Result;

use crate::container::Container;

/// A resolved service instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

type FactoryFn = dyn Fn(&Container) -> Result<Instance> + Send + Sync;

/// Capability object that creates service instances.
pub trait ServiceFactory: Send + Sync {
    /// Creates a new instance. `container` resolves further dependencies.
    ///
    /// # Errors
    ///
    /// Returns whatever error prevented the instance from being built; the
    /// container hands it to the `get` caller unchanged.
    fn create(&self, container: &Container) -> Result<Instance>;
}

/// A callable or a factory object.
#[derive(Clone)]
pub enum Factory {
    /// A closure or function.
    Callable(Arc<FactoryFn>),
    /// An object implementing [`ServiceFactory`].
    Object(Arc<dyn ServiceFactory>),
}

impl Factory {
    /// Wraps a closure.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&Container) -> Result<Instance> + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    /// Wraps a factory object.
    pub fn object<F>(factory: F) -> Self
    where
        F: ServiceFactory + 'static,
    {
        Self::Object(Arc::new(factory))
    }

    /// Invokes the factory.
    ///
    /// # Errors
    ///
    /// Propagates the factory's error.
    pub fn invoke(&self, container: &Container) -> Result<Instance> {
        match self {
            Self::Callable(f) => f(container),
            Self::Object(factory) => factory.create(container),
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Factory::Callable"),
            Self::Object(_) => f.write_str("Factory::Object"),
        }
    }
}
