// src/stmt/compat.rs
//
// Return-type compatibility: maps what a return statement produces onto the
// five categories a routine contract distinguishes. Kept free of emission so
// the mapping can be checked on its own.

use crate::errors::{CodegenError, CodegenResult};
use crate::routine::{ReturnCategory, ReturnTypeFlags};
use crate::types::{ExprType, VarType};

/// Category of a resolved non-variable value. `None` means unchecked.
pub fn kind_category(kind: ExprType) -> Option<ReturnCategory> {
    match kind {
        ExprType::Null => Some(ReturnCategory::Null),
        ExprType::Int | ExprType::Uint | ExprType::Long | ExprType::Char | ExprType::Uchar => {
            Some(ReturnCategory::Integer)
        }
        ExprType::Bool => Some(ReturnCategory::Boolean),
        ExprType::Double => Some(ReturnCategory::Double),
        ExprType::String | ExprType::IString => Some(ReturnCategory::String),
        ExprType::Array | ExprType::Variable | ExprType::ClassEntry => None,
    }
}

/// Category of a slot's static type. Dynamic slots are never checked.
pub fn var_type_category(ty: VarType) -> Option<ReturnCategory> {
    match ty {
        VarType::Int | VarType::Uint | VarType::Long | VarType::Char | VarType::Uchar => {
            Some(ReturnCategory::Integer)
        }
        VarType::Bool => Some(ReturnCategory::Boolean),
        VarType::Double => Some(ReturnCategory::Double),
        VarType::String => Some(ReturnCategory::String),
        VarType::Array | VarType::Variable | VarType::ClassEntry | VarType::CallCache => None,
    }
}

/// Reject a returned value the contract's flags exclude.
///
/// `slot_type` is the static type of the referenced slot when `kind` is
/// `Variable`.
pub fn check_return(
    flags: &ReturnTypeFlags,
    kind: ExprType,
    slot_type: Option<VarType>,
) -> CodegenResult<()> {
    let (category, found) = match (kind, slot_type) {
        (ExprType::Variable, Some(ty)) => (var_type_category(ty), ty.name()),
        (kind, _) => (kind_category(kind), kind.name()),
    };
    match category {
        Some(category) if !flags.accepts(category) => Err(CodegenError::incompatible_return(found)),
        _ => Ok(()),
    }
}
