// src/types.rs
//
// Static types of symbol slots and kinds of compiled expressions.

use quill_frontend::{Expr, NodeId, Span, TypeHint};

/// Static type of a symbol slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Int,
    Uint,
    Long,
    Char,
    Uchar,
    Bool,
    Double,
    String,
    Array,
    /// Dynamically typed host value (a "variant").
    Variable,
    /// Low-level handle to a host class entry.
    ClassEntry,
    /// Low-level per-call-site function lookup cache.
    CallCache,
}

impl VarType {
    pub fn name(self) -> &'static str {
        match self {
            VarType::Int => "int",
            VarType::Uint => "uint",
            VarType::Long => "long",
            VarType::Char => "char",
            VarType::Uchar => "uchar",
            VarType::Bool => "bool",
            VarType::Double => "double",
            VarType::String => "string",
            VarType::Array => "array",
            VarType::Variable => "variable",
            VarType::ClassEntry => "class-entry",
            VarType::CallCache => "fcall-cache",
        }
    }

    /// Slot type for a source type annotation. `null` and `void` name no slot.
    pub fn from_hint(hint: TypeHint) -> Option<Self> {
        Some(match hint {
            TypeHint::Int => VarType::Int,
            TypeHint::Uint => VarType::Uint,
            TypeHint::Long => VarType::Long,
            TypeHint::Char => VarType::Char,
            TypeHint::Uchar => VarType::Uchar,
            TypeHint::Bool => VarType::Bool,
            TypeHint::Double => VarType::Double,
            TypeHint::String => VarType::String,
            TypeHint::Array => VarType::Array,
            TypeHint::Var => VarType::Variable,
            TypeHint::Null | TypeHint::Void => return None,
        })
    }

    #[inline]
    pub fn is_variant(self) -> bool {
        self == VarType::Variable
    }

    #[inline]
    pub fn is_integer_family(self) -> bool {
        matches!(
            self,
            VarType::Int | VarType::Uint | VarType::Long | VarType::Char | VarType::Uchar
        )
    }

    /// Slots that can hold a host value (boxed, reference counted).
    #[inline]
    pub fn is_host_value(self) -> bool {
        matches!(self, VarType::Variable | VarType::String | VarType::Array)
    }

    /// True when a call producing a host value can never be stored here.
    #[inline]
    pub fn is_not_variable_and_string(self) -> bool {
        !matches!(self, VarType::Variable | VarType::String)
    }
}

/// Kind of a compiled expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprType {
    Null,
    Bool,
    Int,
    Uint,
    Long,
    Char,
    Uchar,
    Double,
    String,
    /// String emitted verbatim, without escape processing.
    IString,
    Array,
    /// Reference to a runtime slot; `code` is the slot name.
    Variable,
    /// Class entry handle; `code` is the handle's symbol.
    ClassEntry,
}

impl ExprType {
    pub fn name(self) -> &'static str {
        match self {
            ExprType::Null => "null",
            ExprType::Bool => "bool",
            ExprType::Int => "int",
            ExprType::Uint => "uint",
            ExprType::Long => "long",
            ExprType::Char => "char",
            ExprType::Uchar => "uchar",
            ExprType::Double => "double",
            ExprType::String => "string",
            ExprType::IString => "istring",
            ExprType::Array => "array",
            ExprType::Variable => "variable",
            ExprType::ClassEntry => "class-entry",
        }
    }

    #[inline]
    pub fn is_integer_family(self) -> bool {
        matches!(
            self,
            ExprType::Int | ExprType::Uint | ExprType::Long | ExprType::Char | ExprType::Uchar
        )
    }
}

/// Result of resolving an expression.
///
/// Either a literal known at compile time (`code` is its textual value) or a
/// reference to a runtime slot (`kind == Variable`, `code` is the slot name).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    pub kind: ExprType,
    pub code: String,
    /// Node this value was compiled from, for diagnostics.
    pub node: NodeId,
    pub span: Span,
}

impl CompiledExpression {
    pub fn new(kind: ExprType, code: impl Into<String>, origin: &Expr) -> Self {
        Self {
            kind,
            code: code.into(),
            node: origin.id,
            span: origin.span,
        }
    }

    pub fn null(origin: &Expr) -> Self {
        Self::new(ExprType::Null, "null", origin)
    }

    pub fn variable(name: impl Into<String>, origin: &Expr) -> Self {
        Self::new(ExprType::Variable, name, origin)
    }

    #[inline]
    pub fn is_variable(&self) -> bool {
        self.kind == ExprType::Variable
    }

    /// Boolean literals coded as the host's integer truth values.
    pub fn boolean_code(&self) -> &str {
        match self.code.as_str() {
            "true" => "1",
            "false" => "0",
            other => other,
        }
    }
}
