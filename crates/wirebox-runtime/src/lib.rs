//! # wirebox-runtime
//!
//! The minimal generic resolver used standalone (dynamic binding) and as the
//! base every compiled module loads into.
//!
//! - [`Container`](container::Container): parameters, resolver-kind table,
//!   shared-instance cache, and `get`/`bind`/`set` dispatch.
//! - [`ResolverKind`](kind::ResolverKind): how a registered name produces
//!   its value.
//! - [`Factory`](factory::Factory): callables and factory objects bound to
//!   names.
//! - [`ClassRegistry`](class::ClassRegistry): host classes that compiled and
//!   dynamic definitions construct by name.

pub mod class;
pub mod container;
pub mod factory;
pub mod kind;

pub use class::{Arg, Boxed, Class, ClassRegistry, PendingInstance, ServiceClass};
pub use container::{CompiledUnits, Container};
pub use factory::{Factory, Instance, ServiceFactory};
pub use kind::ResolverKind;
