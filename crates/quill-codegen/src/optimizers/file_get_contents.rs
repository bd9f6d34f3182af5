// src/optimizers/file_get_contents.rs

use quill_frontend::Expr;
use smallvec::smallvec;

use super::{FunctionOptimizer, Optimized};
use crate::calls::Call;
use crate::context::CompilationContext;
use crate::errors::{CodegenError, CodegenResult};
use crate::instr::Instruction;
use crate::runtime_registry::{NativeOp, RuntimeModule};
use crate::types::CompiledExpression;

/// `file_get_contents(path)` read straight into the destination slot.
///
/// Without a destination the contents are read and discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileGetContentsOptimizer;

impl FunctionOptimizer for FileGetContentsOptimizer {
    fn name(&self) -> &'static str {
        "file_get_contents"
    }

    fn attempt(
        &self,
        expr: &Expr,
        call: &mut Call<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<Optimized> {
        if call.args().len() != 1 {
            return Ok(Optimized::NotApplicable);
        }

        call.process_expected_return(ctx);
        let dest = call.symbol_variable(false, ctx);
        if let Some(dest) = &dest
            && let Some(variable) = ctx.symbols.get(dest)
            && variable.ty().is_not_variable_and_string()
        {
            return Err(CodegenError::incompatible_target(
                call.name(),
                dest.as_str(),
                variable.ty().name(),
            )
            .with_span(expr.span));
        }

        ctx.require_header(RuntimeModule::File);
        let mut args = call.read_only_resolved_params(ctx)?;
        let path = args.remove(0);

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
            module: NativeOp::FileGetContents.module(),
            op: NativeOp::FileGetContents,
            dest: dest_handle,
            args: smallvec![path],
        });

        Ok(Optimized::Specialized(match dest {
            Some(dest) => CompiledExpression::variable(dest, expr),
            None => CompiledExpression::null(expr),
        }))
    }
}
