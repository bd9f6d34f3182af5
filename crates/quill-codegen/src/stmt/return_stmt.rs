// src/stmt/return_stmt.rs
//
// Return statement lowering.
//
// Dynamic slots are handed to the caller according to who owns them:
// - receiver: RETURN_RECEIVER
// - return_value: already in place, RETURN_FINALIZE
// - external (borrowed): copy into return_value, then RETURN_FINALIZE
// - local-only: RETURN_LOCAL_TRANSFER, no refcount change
// - untracked: RETURN_COPY
// - tracked: RETURN_REFCOUNT_PRESERVE

use quill_frontend::{FieldAccessExpr, ReturnStmt};
use smallvec::{SmallVec, smallvec};

use super::compat::check_return;
use crate::backend::{HostBackend, escape_c_string};
use crate::context::CompilationContext;
use crate::errors::{CodegenError, CodegenResult, ReturnContext};
use crate::expr::{Expectation, resolve};
use crate::instr::Instruction;
use crate::runtime_registry::RuntimeModule;
use crate::symbols::{RETURN_VALUE, ReturnOwnership, SymbolVariable};
use crate::types::{CompiledExpression, ExprType, VarType};

/// Instructions one return lowers to.
pub type ReturnSequence = SmallVec<[Instruction; 2]>;

impl CompilationContext<'_> {
    /// Compile a return statement. Always terminates the block.
    #[tracing::instrument(level = "debug", skip_all, fields(routine = %self.routine().name))]
    pub fn return_stmt(&mut self, ret: &ReturnStmt) -> CodegenResult<bool> {
        let Some(value) = &ret.value else {
            self.emit(Instruction::ReturnNone);
            return Ok(true);
        };

        if self.routine().is_constructor {
            return Err(CodegenError::return_not_allowed(ReturnContext::Constructor)
                .with_span(value.span));
        }
        if self.routine().is_void {
            return Err(CodegenError::return_not_allowed(ReturnContext::Void).with_span(value.span));
        }

        if let Some(access) = value.as_receiver_field() {
            self.return_member(access)?;
            return Ok(true);
        }

        let resolved = resolve(value, &Expectation::into_slot(RETURN_VALUE), self)?;
        let slot = if resolved.is_variable() {
            Some(
                self.symbols
                    .variable_for_read(&resolved.code)
                    .map_err(|err| err.with_span(value.span))?
                    .clone(),
            )
        } else {
            None
        };

        if let Some(flags) = &self.routine().return_types {
            check_return(flags, resolved.kind, slot.as_ref().map(SymbolVariable::ty))
                .map_err(|err| err.with_span(value.span))?;
        }

        let sequence = match &slot {
            Some(slot) => variable_return(slot, self.backend()),
            None => value_return(&resolved, self),
        }
        .map_err(|err| err.with_span(value.span))?;
        tracing::debug!(kind = resolved.kind.name(), len = sequence.len(), "return lowered");
        for instruction in sequence {
            self.emit(instruction);
        }

        if let Some(slot) = slot
            && slot.ty().is_variant()
            && slot.is_temporary()
            && let Some(temp) = self.symbols.get_mut(slot.name())
        {
            temp.set_idle(true);
        }
        Ok(true)
    }

    /// `return this.<prop>`, read straight from the receiver.
    fn return_member(&mut self, access: &FieldAccessExpr) -> CodegenResult<()> {
        let class = self.class().ok_or_else(|| {
            CodegenError::unsupported_with_context(
                "member return",
                format!("`this.{}` outside of a class method", access.field),
            )
            .with_span(access.field_span)
        })?;
        if !class.has_property(&access.field) {
            return Err(
                CodegenError::missing_property(class.complete_name(), access.field.as_str())
                    .with_span(access.field_span),
            );
        }
        self.require_header(RuntimeModule::Object);
        self.emit(Instruction::ReturnMember(access.field.clone()));
        Ok(())
    }
}

/// Lowering for a value that is not a slot reference.
pub fn value_return(
    resolved: &CompiledExpression,
    ctx: &CompilationContext<'_>,
) -> CodegenResult<ReturnSequence> {
    Ok(match resolved.kind {
        ExprType::Null => smallvec![Instruction::ReturnNone],
        ExprType::Int | ExprType::Uint | ExprType::Long | ExprType::Char | ExprType::Uchar => {
            smallvec![Instruction::ReturnLong(resolved.code.clone())]
        }
        ExprType::Bool => smallvec![Instruction::ReturnBool(resolved.boolean_code().to_string())],
        ExprType::Double => smallvec![Instruction::ReturnDouble(resolved.code.clone())],
        ExprType::String | ExprType::IString => {
            smallvec![ctx.backend().return_string(escape_c_string(&resolved.code))]
        }
        ExprType::Array if resolved.code == RETURN_VALUE => smallvec![Instruction::ReturnFinalize],
        ExprType::Array => smallvec![Instruction::ReturnCopy(ctx.variable_handle(&resolved.code)?)],
        ExprType::ClassEntry => return Err(CodegenError::cannot_return(resolved.kind.name())),
        ExprType::Variable => {
            return Err(CodegenError::internal_with_context(
                "slot reference lowered as a value",
                resolved.code.as_str(),
            ));
        }
    })
}

/// Lowering for a reference to `slot`, by its static type.
pub fn variable_return(
    slot: &SymbolVariable,
    backend: &dyn HostBackend,
) -> CodegenResult<ReturnSequence> {
    let name = slot.name().to_string();
    Ok(match slot.ty() {
        VarType::Int | VarType::Uint | VarType::Long | VarType::Char | VarType::Uchar => {
            smallvec![Instruction::ReturnLong(name)]
        }
        VarType::Double => smallvec![Instruction::ReturnDouble(name)],
        VarType::Bool => smallvec![Instruction::ReturnBool(name)],
        VarType::String | VarType::Array => {
            smallvec![Instruction::ReturnCopy(backend.variable_handle(slot))]
        }
        VarType::Variable => dynamic_return(slot, backend),
        VarType::ClassEntry | VarType::CallCache => {
            return Err(CodegenError::cannot_return_variable(slot.ty().name()));
        }
    })
}

/// Ownership-aware return of a dynamically typed slot.
pub fn dynamic_return(slot: &SymbolVariable, backend: &dyn HostBackend) -> ReturnSequence {
    if slot.is_receiver() {
        return smallvec![Instruction::ReturnReceiver];
    }
    if slot.is_return_value() {
        return smallvec![Instruction::ReturnFinalize];
    }
    let handle = backend.variable_handle(slot);
    match slot.ownership() {
        ReturnOwnership::Borrowed => {
            smallvec![Instruction::RetvalCopy(handle), Instruction::ReturnFinalize]
        }
        ReturnOwnership::LocalOnly => smallvec![Instruction::ReturnLocalTransfer(handle)],
        ReturnOwnership::Untracked => smallvec![Instruction::ReturnCopy(handle)],
        ReturnOwnership::Tracked => smallvec![Instruction::ReturnRefcountPreserve(handle)],
    }
}
