//! # wirebox-common
//!
//! Shared error definitions, literal values, build configuration, and
//! constants used across the entire wirebox workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives every stage of the pipeline
//! (lexer, interpreter, compiler, runtime) builds upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
