// src/lib.rs
//! Quill: type-directed code emission for native extensions of a dynamic
//! host runtime.
//!
//! This crate ties the pieces together: the AST (`frontend`), the emission
//! engine (`codegen`), options loading, tracing setup and diagnostic
//! rendering.

mod config;
mod logging;
mod report;

pub use config::{OptionsError, load_options};
pub use logging::init_tracing;
pub use report::report;

pub use quill_codegen as codegen;
pub use quill_frontend as frontend;
pub use quill_identity as identity;

pub use quill_codegen::{
    CodegenError, CodegenOptions, CompilationUnit, CompiledUnit, GenericCallPath,
    OptimizerRegistry, compile_unit,
};
