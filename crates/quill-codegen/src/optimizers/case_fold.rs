// src/optimizers/case_fold.rs

use quill_frontend::Expr;
use smallvec::smallvec;

use super::{FunctionOptimizer, Optimized};
use crate::calls::Call;
use crate::context::CompilationContext;
use crate::errors::{CodegenError, CodegenResult};
use crate::instr::Instruction;
use crate::runtime_registry::{NativeOp, RuntimeModule};
use crate::types::{CompiledExpression, VarType};

/// `strtolower(s)` / `strtoupper(s)` through the kernel's ASCII case fold.
#[derive(Debug, Clone, Copy)]
pub struct CaseFoldOptimizer {
    function: &'static str,
    op: NativeOp,
}

impl CaseFoldOptimizer {
    pub fn lower() -> Self {
        Self {
            function: "strtolower",
            op: NativeOp::FastStrToLower,
        }
    }

    pub fn upper() -> Self {
        Self {
            function: "strtoupper",
            op: NativeOp::FastStrToUpper,
        }
    }
}

impl FunctionOptimizer for CaseFoldOptimizer {
    fn name(&self) -> &'static str {
        self.function
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
        let Some(dest) = call.symbol_variable(true, ctx) else {
            return Err(CodegenError::internal_with_context(
                "call destination missing",
                self.function,
            ));
        };
        let variable = ctx
            .symbols
            .get_mut(&dest)
            .ok_or_else(|| CodegenError::undefined_variable(dest.as_str()))?;
        if variable.ty().is_not_variable_and_string() {
            return Err(
                CodegenError::incompatible_target(self.function, dest.as_str(), variable.ty().name())
                    .with_span(expr.span),
            );
        }
        if variable.ty().is_variant() {
            variable.widen_dynamic_type(VarType::String);
        }

        ctx.require_header(RuntimeModule::String);
        let mut args = call.read_only_resolved_params(ctx)?;
        if call.must_init_symbol_variable() {
            ctx.init_variant(&dest)?;
        }
        let dest_handle = ctx.variable_handle(&dest)?;
        ctx.emit(Instruction::CallSpecialized {
            module: self.op.module(),
            op: self.op,
            dest: Some(dest_handle),
            args: smallvec![args.remove(0)],
        });

        Ok(Optimized::Specialized(CompiledExpression::variable(dest, expr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizers::OptimizerRegistry;
    use crate::optimizers::tests::RecordingGenericPath;
    use crate::options::CodegenOptions;
    use crate::routine::RoutineContract;
    use crate::symbols::StorageClass;
    use quill_frontend::{AstBuilder, ExprKind};

    #[test]
    fn folds_into_expected_slot() {
        let registry = OptimizerRegistry::empty();
        let generic = RecordingGenericPath::default();
        let mut ctx = CompilationContext::new(
            RoutineContract::new("m"),
            &registry,
            &generic,
            CodegenOptions::default(),
        );
        ctx.declare_or_get_variable("name", VarType::Variable, StorageClass::External)
            .unwrap()
            .set_initialized(true);
        ctx.declare_or_get_variable("lower", VarType::Variable, StorageClass::MemoryTracked)
            .unwrap();
        let b = AstBuilder::new();
        let expr = b.call("strtolower", vec![b.var("name")]);
        let ExprKind::Call(call_expr) = &expr.kind else {
            unreachable!()
        };
        let mut call = Call::new(call_expr, Some("lower"));

        let outcome = CaseFoldOptimizer::lower()
            .attempt(&expr, &mut call, &mut ctx)
            .unwrap();
        assert!(matches!(outcome, Optimized::Specialized(ref c) if c.code == "lower"));
        assert_eq!(
            ctx.instructions().last().unwrap().to_string(),
            "CALL_SPECIALIZED(kernel/string, kernel_fast_strtolower, &lower, &name)"
        );
        assert!(ctx.symbols.get("lower").unwrap().has_dynamic_type(VarType::String));
    }

    #[test]
    fn upper_uses_its_own_routine() {
        let upper = CaseFoldOptimizer::upper();
        assert_eq!(upper.name(), "strtoupper");
        assert_eq!(upper.op, NativeOp::FastStrToUpper);
    }
}
