//! # wirebox-compiler
//!
//! Back end of the wirebox toolchain.
//!
//! - [`ContainerBuilder`](builder::ContainerBuilder): validates names,
//!   assigns resolver methods, and wires arguments into a
//!   [`CompiledModule`](ir::CompiledModule).
//! - [`module`]: loads a compiled module into a runtime container.
//! - [`render`]: turns a compiled module into source text.
//! - [`dynamic`]: binds a namespace onto a container without compiling.

pub mod builder;
pub mod dynamic;
pub mod ir;
pub mod module;
pub mod naming;
pub mod render;

pub use builder::ContainerBuilder;
pub use dynamic::{DefinitionFactory, bind_namespace};
pub use ir::{CallStep, CompiledModule, Construct, Expr, ResolverUnit};
pub use module::ModuleUnits;
pub use render::{Renderer, RustRenderer};
