// src/stmt/mod.rs
//
// Statement and block compilation - impl CompilationContext methods.

pub mod compat;
mod return_stmt;

pub use return_stmt::{ReturnSequence, dynamic_return, value_return, variable_return};

use quill_frontend::{Block, LetStmt, Stmt};

use crate::context::CompilationContext;
use crate::errors::{CodegenError, CodegenResult};
use crate::expr::{Expectation, operand_for, resolve};
use crate::instr::Instruction;
use crate::symbols::StorageClass;
use crate::types::{CompiledExpression, ExprType, VarType};

impl CompilationContext<'_> {
    /// Compile a block of statements. Returns true if terminated (return).
    ///
    /// Statements after a terminating statement are unreachable and are not
    /// compiled.
    pub fn block(&mut self, block: &Block) -> CodegenResult<bool> {
        let mut terminated = false;
        for stmt in &block.stmts {
            if terminated {
                tracing::trace!(span = %stmt.span(), "skipping unreachable statement");
                break;
            }
            terminated = self.stmt(stmt)?;
        }
        Ok(terminated)
    }

    /// Compile a statement. Returns true if terminated (return).
    pub fn stmt(&mut self, stmt: &Stmt) -> CodegenResult<bool> {
        match stmt {
            Stmt::Let(let_stmt) => self.let_stmt(let_stmt),
            Stmt::Expr(expr_stmt) => {
                let value = resolve(&expr_stmt.expr, &Expectation::none(), self)?;
                // The value is discarded: a temporary holding it is free again.
                if matches!(value.kind, ExprType::Variable | ExprType::Array)
                    && let Some(slot) = self.symbols.get_mut(&value.code)
                    && slot.is_temporary()
                {
                    slot.set_idle(true);
                }
                Ok(false)
            }
            Stmt::Return(ret) => self.return_stmt(ret),
        }
    }

    fn let_stmt(&mut self, let_stmt: &LetStmt) -> CodegenResult<bool> {
        let Some(ty) = VarType::from_hint(let_stmt.ty) else {
            return Err(CodegenError::unsupported_with_context(
                "variable type",
                format!("'{}' cannot be used for a variable", let_stmt.ty.name()),
            )
            .with_span(let_stmt.span));
        };
        let storage = if ty.is_host_value() {
            StorageClass::MemoryTracked
        } else {
            StorageClass::LocalOnly
        };
        self.declare_or_get_variable(&let_stmt.name, ty, storage)
            .map_err(|err| err.with_span(let_stmt.span))?;

        let Some(init) = &let_stmt.init else {
            return Ok(false);
        };
        let value = resolve(init, &Expectation::into_slot(let_stmt.name.as_str()), self)?;

        let written_in_place = matches!(value.kind, ExprType::Variable | ExprType::Array)
            && value.code == let_stmt.name;
        if !written_in_place {
            self.assign(&let_stmt.name, ty, &value)
                .map_err(|err| err.with_span(init.span))?;
        }
        if let Some(slot) = self.symbols.get_mut(&let_stmt.name) {
            slot.set_initialized(true);
        }
        Ok(false)
    }

    /// Store `value` into the slot `name` of static type `ty`.
    fn assign(&mut self, name: &str, ty: VarType, value: &CompiledExpression) -> CodegenResult<()> {
        let source_ty = if value.is_variable() {
            Some(self.symbols.variable_for_read(&value.code)?.ty())
        } else {
            None
        };
        if !assignable(ty, value.kind, source_ty) {
            let found = source_ty.map_or(value.kind.name(), VarType::name);
            return Err(CodegenError::incompatible_assignment(name, ty.name(), found));
        }
        let operand = operand_for(value, self)?;
        if ty.is_variant() {
            self.init_variant(name)?;
        }
        let handle = self.variable_handle(name)?;
        self.emit(Instruction::Assign {
            handle,
            value: operand,
        });
        Ok(())
    }
}

/// Whether a value of `kind` (or a slot of `source` type) fits a `target` slot.
fn assignable(target: VarType, kind: ExprType, source: Option<VarType>) -> bool {
    if let Some(source) = source {
        return match target {
            VarType::Variable => !matches!(source, VarType::ClassEntry | VarType::CallCache),
            _ if target.is_integer_family() => source.is_integer_family(),
            VarType::Double => source == VarType::Double || source.is_integer_family(),
            _ => source == target,
        };
    }
    match target {
        VarType::Variable => kind != ExprType::ClassEntry,
        _ if target.is_integer_family() => kind.is_integer_family(),
        VarType::Double => kind == ExprType::Double || kind.is_integer_family(),
        VarType::Bool => kind == ExprType::Bool,
        VarType::String => matches!(kind, ExprType::String | ExprType::IString),
        VarType::Array => kind == ExprType::Array,
        _ => false,
    }
}
