//! # wirebox-sdk
//!
//! Public SDK for using wirebox as a Rust library.
//!
//! [`ContainerFactory`] runs the whole pipeline in one call. The pipeline
//! crates are re-exported for finer control.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use wirebox_sdk::ContainerFactory;
//! use wirebox_sdk::runtime::{Arg, Class, ClassRegistry};
//!
//! struct Logger {
//!     name: String,
//! }
//!
//! let classes = ClassRegistry::new().with(
//!     "app.Logger",
//!     Class::new("app.Logger").constructor(|args: Vec<Arg>| {
//!         Ok(Logger {
//!             name: args.first().and_then(Arg::as_str).unwrap_or("main").to_owned(),
//!         })
//!     }),
//! );
//! let container = ContainerFactory::from_dir(Path::new("config"), classes)
//!     .create("app")?;
//! let logger = container.get("logger")?;
//! # Ok::<(), wirebox_sdk::common::error::WireboxError>(())
//! ```

pub mod factory;

pub use factory::ContainerFactory;

pub use wirebox_common as common;
pub use wirebox_compiler as compiler;
pub use wirebox_lang as lang;
pub use wirebox_runtime as runtime;
