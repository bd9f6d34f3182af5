// src/optimizers/microtime.rs

use quill_frontend::Expr;
use smallvec::smallvec;

use super::{FunctionOptimizer, Optimized};
use crate::calls::Call;
use crate::context::CompilationContext;
use crate::errors::{CodegenError, CodegenResult};
use crate::instr::{ArgVec, Instruction};
use crate::runtime_registry::{NativeOp, RuntimeModule};
use crate::types::{CompiledExpression, VarType};

/// `microtime()` and `microtime(as_float)` written into a variant slot.
///
/// The zero-argument form produces the "msec sec" string, the one-argument
/// form a float when its flag is set. The result always needs a slot, so a
/// temporary is allocated when the caller expects nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrotimeOptimizer;

impl FunctionOptimizer for MicrotimeOptimizer {
    fn name(&self) -> &'static str {
        "microtime"
    }

    fn attempt(
        &self,
        expr: &Expr,
        call: &mut Call<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<Optimized> {
        if call.args().len() > 2 {
            return Ok(Optimized::NotApplicable);
        }

        call.process_expected_return(ctx);
        let Some(dest) = call.symbol_variable(true, ctx) else {
            return Err(CodegenError::internal_with_context(
                "call destination missing",
                call.name(),
            ));
        };
        let ty = ctx
            .symbols
            .get(&dest)
            .map(|variable| variable.ty())
            .ok_or_else(|| CodegenError::undefined_variable(dest.as_str()))?;
        if ty.is_not_variable_and_string() {
            return Err(
                CodegenError::incompatible_target(call.name(), dest.as_str(), ty.name())
                    .with_span(expr.span),
            );
        }

        ctx.require_header(RuntimeModule::Time);
        let args: ArgVec = if call.args().is_empty() {
            widen(ctx, &dest, VarType::String);
            ArgVec::new()
        } else {
            widen(ctx, &dest, VarType::Double);
            let params = call.read_only_resolved_params(ctx)?;
            smallvec![params[0].clone()]
        };

        if call.must_init_symbol_variable() {
            ctx.init_variant(&dest)?;
        }
        let dest_handle = ctx.variable_handle(&dest)?;
        ctx.emit(Instruction::CallSpecialized {
            module: NativeOp::Microtime.module(),
            op: NativeOp::Microtime,
            dest: Some(dest_handle),
            args,
        });

        Ok(Optimized::Specialized(CompiledExpression::variable(dest, expr)))
    }
}

fn widen(ctx: &mut CompilationContext<'_>, name: &str, ty: VarType) {
    if let Some(variable) = ctx.symbols.get_mut(name) {
        variable.widen_dynamic_type(ty);
    }
}
