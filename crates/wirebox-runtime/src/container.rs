//! The runtime container.
//!
//! Holds parameters, the resolver-kind table, bound factories, and the
//! shared-instance cache of one container instance. Compiled modules load
//! into a container by registering their resolver units through
//! [`CompiledUnits`]; everything else is dynamic binding.
//!
//! All tables sit behind a single mutex. The lock is released before any
//! factory or resolver unit runs, so factories may call back into `get`.
//! Storing a shared instance is first-writer-wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use wirebox_common::constants::SELF_NAME;
use wirebox_common::error::{Result, WireboxError};
use wirebox_common::types::Value;

use crate::factory::{Factory, Instance};
use crate::kind::ResolverKind;

/// Statically generated resolver units a container dispatches `Method`
/// kinds to.
pub trait CompiledUnits: Send + Sync {
    /// Runs the resolver unit registered as `method`.
    ///
    /// # Errors
    ///
    /// Returns an error if `method` is unknown or building the service
    /// fails.
    fn call(&self, container: &Container, method: &str) -> Result<Instance>;
}

#[derive(Default)]
struct State {
    parameters: HashMap<String, Value>,
    kinds: IndexMap<String, ResolverKind>,
    method_names: HashMap<String, String>,
    factories: HashMap<String, Factory>,
    shared_factories: HashMap<String, Factory>,
    resolved: HashMap<String, Instance>,
}

impl State {
    fn unregister(&mut self, name: &str) {
        let _ = self.method_names.remove(name);
        let _ = self.factories.remove(name);
        let _ = self.shared_factories.remove(name);
        let _ = self.resolved.remove(name);
    }
}

struct Inner {
    state: Mutex<State>,
    units: Option<Arc<dyn CompiledUnits>>,
}

/// What `get` does once the lock is released.
enum Dispatch {
    Method(String),
    Factory(Factory),
    Shared(Factory),
    Alias(String),
}

/// A dependency-injection container.
///
/// Cloning yields another handle to the same container.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    /// Creates an empty container without compiled units.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates an empty container that dispatches `Method` kinds to `units`.
    #[must_use]
    pub fn with_units(units: Arc<dyn CompiledUnits>) -> Self {
        Self::build(Some(units))
    }

    fn build(units: Option<Arc<dyn CompiledUnits>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                units,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_bindable(name: &str) -> Result<()> {
        if name == SELF_NAME {
            return Err(WireboxError::Container {
                message: format!("\"{SELF_NAME}\" always resolves to the container and cannot be rebound"),
            });
        }
        Ok(())
    }

    /// Whether `other` is a handle to this same container.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether a parameter named `name` exists.
    #[must_use]
    pub fn has_parameter(&self, name: &str) -> bool {
        self.state().parameters.contains_key(name)
    }

    /// Returns the parameter named `name`, or `default` when absent.
    #[must_use]
    pub fn get_parameter(&self, name: &str, default: Value) -> Value {
        self.parameter(name).unwrap_or(default)
    }

    /// Returns the parameter named `name`.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<Value> {
        self.state().parameters.get(name).cloned()
    }

    /// Inserts or replaces a parameter.
    pub fn set_parameter(&self, name: impl Into<String>, value: impl Into<Value>) {
        let _ = self
            .state()
            .parameters
            .insert(name.into(), value.into());
    }

    /// Whether `name` is the reserved self-name or has a resolver kind.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        name == SELF_NAME || self.state().kinds.contains_key(name)
    }

    /// Resolver kind registered under `name`.
    #[must_use]
    pub fn resolver_kind(&self, name: &str) -> Option<ResolverKind> {
        self.state().kinds.get(name).cloned()
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.state().kinds.keys().cloned().collect()
    }

    /// Injects an already resolved value under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Container`] if `name` is the reserved name.
    pub fn set(&self, name: impl Into<String>, value: Instance) -> Result<()> {
        let name = name.into();
        Self::ensure_bindable(&name)?;
        let mut state = self.state();
        state.unregister(&name);
        let _ = state.resolved.insert(name.clone(), value);
        let _ = state.kinds.insert(name, ResolverKind::Setter);
        Ok(())
    }

    /// Binds a factory under `name`, shared or not. Rebinding replaces the
    /// previous kind and drops any cached instance.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Container`] if `name` is the reserved name.
    pub fn bind(&self, name: impl Into<String>, factory: Factory, shared: bool) -> Result<()> {
        let name = name.into();
        Self::ensure_bindable(&name)?;
        tracing::debug!(service = %name, shared, "binding factory");
        let mut state = self.state();
        state.unregister(&name);
        if shared {
            let _ = state.shared_factories.insert(name.clone(), factory);
            let _ = state.kinds.insert(name, ResolverKind::Shared);
        } else {
            let _ = state.factories.insert(name.clone(), factory);
            let _ = state.kinds.insert(name, ResolverKind::Factory);
        }
        Ok(())
    }

    /// Binds an unshared factory closure.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Container`] if `name` is the reserved name.
    pub fn bind_factory<F>(&self, name: impl Into<String>, f: F) -> Result<()>
    where
        F: Fn(&Self) -> Result<Instance> + Send + Sync + 'static,
    {
        self.bind(name, Factory::callable(f), false)
    }

    /// Binds a shared factory closure.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Container`] if `name` is the reserved name.
    pub fn bind_shared_factory<F>(&self, name: impl Into<String>, f: F) -> Result<()>
    where
        F: Fn(&Self) -> Result<Instance> + Send + Sync + 'static,
    {
        self.bind(name, Factory::callable(f), true)
    }

    /// Makes `name` forward to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Container`] if `name` is the reserved name or
    /// equals `target`.
    pub fn alias(&self, name: impl Into<String>, target: impl Into<String>) -> Result<()> {
        let name = name.into();
        let target = target.into();
        Self::ensure_bindable(&name)?;
        if name == target {
            return Err(WireboxError::Container {
                message: format!("alias \"{name}\" cannot point at itself"),
            });
        }
        let mut state = self.state();
        state.unregister(&name);
        let _ = state.kinds.insert(name, ResolverKind::Alias(target));
        Ok(())
    }

    /// Registers `name` as resolved by the compiled unit `method`.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::Container`] if `name` is the reserved name.
    pub fn register_method(
        &self,
        name: impl Into<String>,
        method: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        Self::ensure_bindable(&name)?;
        let mut state = self.state();
        state.unregister(&name);
        let _ = state.method_names.insert(name.clone(), method.into());
        let _ = state.kinds.insert(name, ResolverKind::Method);
        Ok(())
    }

    /// Resolves `name`.
    ///
    /// The reserved name yields a handle to this container. Shared and
    /// compiled services are built once and cached; factories run on every
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::UnknownService`] if nothing usable is
    /// registered, otherwise whatever the factory or resolver unit returned.
    pub fn get(&self, name: &str) -> Result<Instance> {
        if name == SELF_NAME {
            return Ok(Arc::new(self.clone()));
        }

        let dispatch = {
            let state = self.state();
            let kind = state.kinds.get(name).ok_or_else(|| {
                WireboxError::unknown_service(name, "no service is registered under this name")
            })?;
            if *kind != ResolverKind::Factory {
                if let Some(instance) = state.resolved.get(name) {
                    return Ok(Arc::clone(instance));
                }
            }
            tracing::trace!(service = name, kind = %kind, "resolving service");
            match kind {
                ResolverKind::Method => Dispatch::Method(
                    state.method_names.get(name).cloned().ok_or_else(|| {
                        WireboxError::unknown_service(name, "no resolver method is registered")
                    })?,
                ),
                ResolverKind::Factory => {
                    Dispatch::Factory(state.factories.get(name).cloned().ok_or_else(|| {
                        WireboxError::unknown_service(name, "factory kind without a factory")
                    })?)
                }
                ResolverKind::Shared => {
                    Dispatch::Shared(state.shared_factories.get(name).cloned().ok_or_else(
                        || WireboxError::unknown_service(name, "shared kind without a factory"),
                    )?)
                }
                ResolverKind::Setter => {
                    return Err(WireboxError::unknown_service(
                        name,
                        "the injected value was released",
                    ));
                }
                ResolverKind::Alias(_) => Dispatch::Alias(follow_aliases(&state, name)?),
            }
        };

        match dispatch {
            Dispatch::Method(method) => {
                let units = self.inner.units.as_ref().ok_or_else(|| {
                    WireboxError::unknown_service(name, "container has no compiled resolver units")
                })?;
                units.call(self, &method)
            }
            Dispatch::Factory(factory) => factory.invoke(self),
            Dispatch::Shared(factory) => {
                let instance = factory.invoke(self)?;
                Ok(self.cache_instance(name, instance))
            }
            Dispatch::Alias(target) => self.get(&target),
        }
    }

    /// Whether `name` currently has a cached instance. Unshared factories
    /// are never resolved; the reserved name always is.
    #[must_use]
    pub fn is_resolved(&self, name: &str) -> bool {
        if name == SELF_NAME {
            return true;
        }
        let state = self.state();
        match state.kinds.get(name) {
            Some(ResolverKind::Factory) => false,
            _ => state.resolved.contains_key(name),
        }
    }

    /// Evicts the cached instance of `name`. The next `get` builds a new
    /// one. Returns whether anything was evicted.
    pub fn release(&self, name: &str) -> bool {
        let released = self.state().resolved.remove(name).is_some();
        if released {
            tracing::debug!(service = name, "released shared instance");
        }
        released
    }

    /// Cached instance of `name`, if any. Used by compiled resolver units.
    #[must_use]
    pub fn resolved_instance(&self, name: &str) -> Option<Instance> {
        self.state().resolved.get(name).cloned()
    }

    /// Caches `instance` under `name` unless another instance got there
    /// first, and returns whichever instance is cached.
    pub fn cache_instance(&self, name: &str, instance: Instance) -> Instance {
        Arc::clone(
            self.state()
                .resolved
                .entry(name.to_owned())
                .or_insert(instance),
        )
    }
}

/// Follows an alias chain to the first name that is not an alias.
fn follow_aliases(state: &State, name: &str) -> Result<String> {
    let mut seen = vec![name];
    let mut current = name;
    while let Some(ResolverKind::Alias(target)) = state.kinds.get(current) {
        if seen.contains(&target.as_str()) {
            return Err(WireboxError::unknown_service(
                name,
                format!("alias cycle through \"{target}\""),
            ));
        }
        seen.push(target);
        current = target;
    }
    Ok(current.to_owned())
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Container")
            .field("kinds", &state.kinds)
            .field("parameters", &state.parameters.len())
            .field("resolved", &state.resolved.len())
            .field("compiled", &self.inner.units.is_some())
            .finish()
    }
}
