//! Host classes that service definitions construct by name.
//!
//! A definition names its target by a class identifier such as
//! `app.Database`. The host registers a [`ServiceClass`] under that
//! identifier; compiled resolver units and dynamically bound definitions
//! both build instances through the same [`ClassRegistry`], so the two
//! paths construct identical services.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use wirebox_common::error::{Result, WireboxError};
use wirebox_common::types::Value;

use crate::factory::Instance;

/// An instance under construction.
pub type Boxed = Box<dyn Any + Send + Sync>;

/// A fully resolved argument handed to a constructor or method.
#[derive(Clone)]
pub enum Arg {
    /// A literal or parameter value.
    Value(Value),
    /// A service instance.
    Service(Instance),
}

impl Arg {
    /// The value, if this argument is one.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Service(_) => None,
        }
    }

    /// The string value, if this argument is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.value().and_then(Value::as_str)
    }

    /// The integer value, if this argument is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        self.value().and_then(Value::as_int)
    }

    /// The service instance downcast to `T`.
    #[must_use]
    pub fn service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Service(instance) => Arc::clone(instance).downcast::<T>().ok(),
            Self::Value(_) => None,
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Service(_) => f.write_str("Service(..)"),
        }
    }
}

/// Constructs and configures instances of one host type.
pub trait ServiceClass: Send + Sync {
    /// Builds an instance through plain construction.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not fit.
    fn construct(&self, args: Vec<Arg>) -> Result<Boxed>;

    /// Builds an instance through the named static factory method.
    ///
    /// # Errors
    ///
    /// Returns an error if the factory does not exist or the arguments do
    /// not fit.
    fn construct_with(&self, factory: &str, args: Vec<Arg>) -> Result<Boxed>;

    /// Calls `method` on a constructed instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the method does not exist or the arguments do not
    /// fit.
    fn call(&self, instance: &mut (dyn Any + Send + Sync), method: &str, args: Vec<Arg>)
    -> Result<()>;
}

type Constructor<T> = dyn Fn(Vec<Arg>) -> Result<T> + Send + Sync;
type Method<T> = dyn Fn(&mut T, Vec<Arg>) -> Result<()> + Send + Sync;

/// Closure-backed [`ServiceClass`] for a concrete type `T`.
pub struct Class<T> {
    name: String,
    constructor: Option<Box<Constructor<T>>>,
    factories: HashMap<String, Box<Constructor<T>>>,
    methods: HashMap<String, Box<Method<T>>>,
}

impl<T: Any + Send + Sync> Class<T> {
    /// Creates a class with no constructor, factories, or methods.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor: None,
            factories: HashMap::new(),
            methods: HashMap::new(),
        }
    }

    /// Sets the plain constructor.
    #[must_use]
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<Arg>) -> Result<T> + Send + Sync + 'static,
    {
        self.constructor = Some(Box::new(f));
        self
    }

    /// Adds a named static factory.
    #[must_use]
    pub fn factory<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Arg>) -> Result<T> + Send + Sync + 'static,
    {
        let _ = self.factories.insert(name.into(), Box::new(f));
        self
    }

    /// Adds a method callable after construction.
    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T, Vec<Arg>) -> Result<()> + Send + Sync + 'static,
    {
        let _ = self.methods.insert(name.into(), Box::new(f));
        self
    }

    fn failure(&self, message: String) -> WireboxError {
        WireboxError::Factory {
            name: self.name.clone(),
            message,
        }
    }
}

impl<T: Any + Send + Sync> ServiceClass for Class<T> {
    fn construct(&self, args: Vec<Arg>) -> Result<Boxed> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or_else(|| self.failure("class has no constructor".into()))?;
        Ok(Box::new(constructor(args)?))
    }

    fn construct_with(&self, factory: &str, args: Vec<Arg>) -> Result<Boxed> {
        let f = self
            .factories
            .get(factory)
            .ok_or_else(|| self.failure(format!("no static factory `{factory}`")))?;
        Ok(Box::new(f(args)?))
    }

    fn call(
        &self,
        instance: &mut (dyn Any + Send + Sync),
        method: &str,
        args: Vec<Arg>,
    ) -> Result<()> {
        let f = self
            .methods
            .get(method)
            .ok_or_else(|| self.failure(format!("no method `{method}`")))?;
        let target = instance
            .downcast_mut::<T>()
            .ok_or_else(|| self.failure(format!("instance is not a `{}`", self.name)))?;
        f(target, args)
    }
}

/// An instance between construction and its final method call.
pub struct PendingInstance {
    class: Arc<dyn ServiceClass>,
    instance: Boxed,
}

impl PendingInstance {
    /// Calls a method on the instance.
    ///
    /// # Errors
    ///
    /// Propagates the method's error.
    pub fn call(&mut self, method: &str, args: Vec<Arg>) -> Result<()> {
        self.class.call(self.instance.as_mut(), method, args)
    }

    /// Freezes the instance into a shareable service.
    #[must_use]
    pub fn finish(self) -> Instance {
        Arc::from(self.instance)
    }
}

/// Class identifier to class.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, Arc<dyn ServiceClass>>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class` under `name`, replacing any previous entry.
    #[must_use]
    pub fn with<C: ServiceClass + 'static>(mut self, name: impl Into<String>, class: C) -> Self {
        self.register(name, class);
        self
    }

    /// Registers `class` under `name`, replacing any previous entry.
    pub fn register<C: ServiceClass + 'static>(&mut self, name: impl Into<String>, class: C) {
        let _ = self.classes.insert(name.into(), Arc::new(class));
    }

    /// Whether a class is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Constructs an instance of `class` for `service`, through the named
    /// static factory when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::InvalidService`] if `class` is not registered,
    /// otherwise whatever the class's constructor returns.
    pub fn construct(
        &self,
        service: &str,
        class: &str,
        factory: Option<&str>,
        args: Vec<Arg>,
    ) -> Result<PendingInstance> {
        let class_impl =
            self.classes
                .get(class)
                .cloned()
                .ok_or_else(|| WireboxError::InvalidService {
                    name: service.to_owned(),
                    message: format!("class `{class}` is not registered"),
                })?;
        let instance = match factory {
            Some(method) => class_impl.construct_with(method, args)?,
            None => class_impl.construct(args)?,
        };
        Ok(PendingInstance {
            class: class_impl,
            instance,
        })
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.classes.keys().collect();
        names.sort();
        f.debug_struct("ClassRegistry")
            .field("classes", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        start: i64,
        steps: Vec<i64>,
    }

    fn counter_class() -> Class<Counter> {
        Class::new("Counter")
            .constructor(|args| {
                Ok(Counter {
                    start: args.first().and_then(Arg::as_int).unwrap_or_default(),
                    steps: Vec::new(),
                })
            })
            .factory("zero", |_| Ok(Counter::default()))
            .method("step", |c: &mut Counter, args| {
                c.steps.push(args.first().and_then(Arg::as_int).unwrap_or(1));
                Ok(())
            })
    }

    #[test]
    fn construct_and_call_methods_in_order() {
        let registry = ClassRegistry::new().with("Counter", counter_class());
        let mut pending = registry
            .construct("counter", "Counter", None, vec![Arg::Value(Value::Int(5))])
            .expect("construct");
        pending.call("step", vec![Arg::Value(Value::Int(2))]).expect("call");
        pending.call("step", vec![]).expect("call");
        let instance = pending.finish().downcast::<Counter>().expect("is a Counter");
        assert_eq!(instance.start, 5);
        assert_eq!(instance.steps, vec![2, 1]);
    }

    #[test]
    fn static_factory_replaces_constructor() {
        let registry = ClassRegistry::new().with("Counter", counter_class());
        let instance = registry
            .construct("counter", "Counter", Some("zero"), vec![Arg::Value(Value::Int(9))])
            .expect("construct")
            .finish()
            .downcast::<Counter>()
            .expect("is a Counter");
        assert_eq!(instance.start, 0);
    }

    #[test]
    fn unknown_class_is_invalid_service() {
        let err = ClassRegistry::new()
            .construct("svc", "Missing", None, vec![])
            .err()
            .expect("should fail");
        assert!(matches!(err, WireboxError::InvalidService { ref name, .. } if name == "svc"));
    }

    #[test]
    fn unknown_method_and_factory_fail() {
        let registry = ClassRegistry::new().with("Counter", counter_class());
        let mut pending = registry
            .construct("c", "Counter", None, vec![])
            .expect("construct");
        assert!(pending.call("nope", vec![]).is_err());
        assert!(registry.construct("c", "Counter", Some("nope"), vec![]).is_err());
    }

    #[test]
    fn arg_service_downcasts() {
        let arg = Arg::Service(Arc::new(Counter::default()));
        assert!(arg.service::<Counter>().is_some());
        assert!(arg.service::<String>().is_none());
        assert!(arg.value().is_none());
    }
}
