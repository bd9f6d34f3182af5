// src/optimizers/file_put_contents.rs

use quill_frontend::Expr;

use super::{FunctionOptimizer, Optimized};
use crate::calls::Call;
use crate::context::CompilationContext;
use crate::errors::{CodegenError, CodegenResult};
use crate::instr::Instruction;
use crate::runtime_registry::{NativeOp, RuntimeModule};
use crate::types::CompiledExpression;

/// `file_put_contents(path, data)` as a direct kernel write.
///
/// The result (bytes written, or false) can only land in a variant slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePutContentsOptimizer;

impl FunctionOptimizer for FilePutContentsOptimizer {
    fn name(&self) -> &'static str {
        "file_put_contents"
    }

    fn attempt(
        &self,
        expr: &Expr,
        call: &mut Call<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<Optimized> {
        if call.args().len() != 2 {
            return Ok(Optimized::NotApplicable);
        }

        call.process_expected_return(ctx);
        let dest = call.symbol_variable(false, ctx);
        if let Some(dest) = &dest
            && let Some(variable) = ctx.symbols.get(dest)
            && !variable.ty().is_variant()
        {
            return Err(CodegenError::incompatible_target(
                call.name(),
                dest.as_str(),
                variable.ty().name(),
            )
            .with_span(expr.span));
        }

        ctx.require_header(RuntimeModule::File);
        let args = call.read_only_resolved_params(ctx)?;

        let dest_handle = match &dest {
            Some(dest) => {
                if call.must_init_symbol_variable() {
                    ctx.init_variant(dest)?;
                }
                Some(ctx.variable_handle(dest)?)
            }
            None => None,
        };
        ctx.emit(Instruction::CallSpecialized {
            module: NativeOp::FilePutContents.module(),
            op: NativeOp::FilePutContents,
            dest: dest_handle,
            args,
        });

        Ok(Optimized::Specialized(match dest {
            Some(dest) => CompiledExpression::variable(dest, expr),
            None => CompiledExpression::null(expr),
        }))
    }
}
