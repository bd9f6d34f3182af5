// src/calls.rs
//
// State of one call site while it is being compiled: where its result goes
// and what its arguments resolved to.

use quill_frontend::{CallExpr, Expr};

use crate::backend::escape_c_string;
use crate::context::CompilationContext;
use crate::errors::CodegenResult;
use crate::expr::{Expectation, resolve};
use crate::instr::ArgVec;
use crate::types::{CompiledExpression, ExprType, VarType};

/// One call site in progress.
#[derive(Debug)]
pub struct Call<'e> {
    call: &'e CallExpr,
    /// Slot the caller wants the result written to, if any.
    expected: Option<String>,
    /// Destination chosen by `process_expected_return`.
    symbol: Option<String>,
    must_init: bool,
    resolved: Vec<CompiledExpression>,
}

impl<'e> Call<'e> {
    pub fn new(call: &'e CallExpr, expected: Option<&str>) -> Self {
        Self {
            call,
            expected: expected.map(str::to_string),
            symbol: None,
            must_init: false,
            resolved: Vec::new(),
        }
    }

    pub fn name(&self) -> &'e str {
        &self.call.callee
    }

    pub fn args(&self) -> &'e [Expr] {
        &self.call.args
    }

    /// Choose the destination slot for the call's result.
    ///
    /// The expected slot is written in place unless an argument reads it
    /// (`x = f(x)`), in which case a fresh temporary takes the result.
    pub fn process_expected_return(&mut self, ctx: &mut CompilationContext<'_>) {
        let Some(expected) = &self.expected else {
            self.symbol = None;
            self.must_init = false;
            return;
        };
        if self.call.args.iter().any(|arg| arg.reads_variable(expected)) {
            let temp = ctx.symbols.temp_variable_for_write(VarType::Variable);
            tracing::trace!(
                target = expected.as_str(),
                temp = temp.name(),
                "destination read by arguments, using temporary"
            );
            self.symbol = Some(temp.name().to_string());
        } else {
            self.symbol = Some(expected.clone());
        }
        self.must_init = true;
    }

    /// Destination slot of the call.
    ///
    /// With `use_temp`, a temporary is allocated when nothing is expected.
    pub fn symbol_variable(
        &mut self,
        use_temp: bool,
        ctx: &mut CompilationContext<'_>,
    ) -> Option<String> {
        if self.symbol.is_none() && use_temp {
            let temp = ctx.symbols.temp_variable_for_write(VarType::Variable);
            self.symbol = Some(temp.name().to_string());
            self.must_init = true;
        }
        self.symbol.clone()
    }

    /// Whether the destination must be allocated before the call writes it.
    pub fn must_init_symbol_variable(&self) -> bool {
        self.must_init
    }

    /// Resolve every argument read-only and return its low-level operand text.
    pub fn read_only_resolved_params(
        &mut self,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<ArgVec> {
        let mut operands = ArgVec::new();
        self.resolved.clear();
        for arg in self.call.args.iter() {
            let resolved = resolve(arg, &Expectation::none(), ctx)?;
            operands.push(operand_code(&resolved, ctx)?);
            self.resolved.push(resolved);
        }
        Ok(operands)
    }

    pub fn resolved_params(&self) -> &[CompiledExpression] {
        &self.resolved
    }
}

/// Text a kernel routine receives for a resolved argument.
pub(crate) fn operand_code(
    resolved: &CompiledExpression,
    ctx: &CompilationContext<'_>,
) -> CodegenResult<String> {
    Ok(match resolved.kind {
        ExprType::Variable => ctx.variable_handle(&resolved.code)?,
        ExprType::String => format!("\"{}\"", escape_c_string(&resolved.code)),
        ExprType::IString => format!("\"{}\"", resolved.code),
        ExprType::Bool => resolved.boolean_code().to_string(),
        ExprType::Null => "NULL".to_string(),
        ExprType::Int
        | ExprType::Uint
        | ExprType::Long
        | ExprType::Char
        | ExprType::Uchar
        | ExprType::Double
        | ExprType::Array
        | ExprType::ClassEntry => resolved.code.clone(),
    })
}
