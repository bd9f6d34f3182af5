// tests/common/mod.rs
//! Shared fixtures for quill-codegen integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use quill_codegen::{
    Call, CodegenOptions, CodegenResult, CompilationContext, CompilationUnit, CompiledExpression,
    CompiledUnit, GenericCallPath, OptimizerRegistry, compile_unit,
};
use quill_frontend::{Block, Expr, Stmt};

/// Generic call path that records the calls it lowers.
///
/// Writes nothing itself; a call with a destination yields that slot after
/// initializing it, otherwise null.
#[derive(Default)]
pub struct RecordingGenericPath {
    calls: RefCell<Vec<String>>,
}

impl RecordingGenericPath {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl GenericCallPath for RecordingGenericPath {
    fn compile_call(
        &self,
        expr: &Expr,
        call: &mut Call<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression> {
        self.calls.borrow_mut().push(call.name().to_string());
        call.process_expected_return(ctx);
        match call.symbol_variable(false, ctx) {
            Some(dest) => {
                if call.must_init_symbol_variable() {
                    ctx.init_variant(&dest)?;
                }
                Ok(CompiledExpression::variable(dest, expr))
            }
            None => Ok(CompiledExpression::null(expr)),
        }
    }
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block {
        stmts,
        ..Block::default()
    }
}

/// Compile `unit` against the built-in optimizers.
pub fn compile(
    unit: &CompilationUnit,
    generic: &RecordingGenericPath,
) -> CodegenResult<CompiledUnit> {
    compile_unit(
        unit,
        OptimizerRegistry::builtin(),
        generic,
        &CodegenOptions::default(),
    )
}

pub fn lines(unit: &CompiledUnit) -> Vec<String> {
    unit.instructions.iter().map(ToString::to_string).collect()
}
