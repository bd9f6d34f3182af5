// src/ast.rs

use quill_identity::{NodeId, Span};

/// The name the source language uses for the receiver of a method.
pub const RECEIVER_NAME: &str = "this";

/// Type annotation written in source, on a `let` or in a routine signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeHint {
    Int,
    Uint,
    Long,
    Char,
    Uchar,
    Bool,
    Double,
    String,
    Array,
    /// Dynamically typed (`var`)
    Var,
    Null,
    Void,
}

impl TypeHint {
    pub fn name(self) -> &'static str {
        match self {
            TypeHint::Int => "int",
            TypeHint::Uint => "uint",
            TypeHint::Long => "long",
            TypeHint::Char => "char",
            TypeHint::Uchar => "uchar",
            TypeHint::Bool => "bool",
            TypeHint::Double => "double",
            TypeHint::String => "string",
            TypeHint::Array => "array",
            TypeHint::Var => "var",
            TypeHint::Null => "null",
            TypeHint::Void => "void",
        }
    }
}

/// A sequence of statements.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    Let(LetStmt),
    Expr(ExprStmt),
    Return(ReturnStmt),
}

impl Stmt {
    /// Get the span of this statement
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::Return(s) => s.span,
        }
    }
}

/// Variable declaration: `let name: ty = init`
#[derive(Debug, Clone)]
pub struct LetStmt {
    pub name: String,
    pub ty: TypeHint,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Expression statement
#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// Return statement
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Expressions
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    /// Returns true if this expression is a literal value
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::IntLiteral(_)
                | ExprKind::FloatLiteral(_)
                | ExprKind::BoolLiteral(_)
                | ExprKind::CharLiteral(_)
                | ExprKind::StringLiteral(_)
                | ExprKind::InterpolatedString(_)
                | ExprKind::NullLiteral
        )
    }

    /// Returns true if this is `this.<field>`.
    pub fn as_receiver_field(&self) -> Option<&FieldAccessExpr> {
        match &self.kind {
            ExprKind::FieldAccess(fa)
                if matches!(&fa.object.kind, ExprKind::Identifier(name) if name == RECEIVER_NAME) =>
            {
                Some(fa)
            }
            _ => None,
        }
    }

    /// Returns true if `name` is read anywhere in this expression tree.
    pub fn reads_variable(&self, name: &str) -> bool {
        match &self.kind {
            ExprKind::Identifier(ident) => ident == name,
            ExprKind::Call(call) => call.args.iter().any(|arg| arg.reads_variable(name)),
            ExprKind::FieldAccess(fa) => fa.object.reads_variable(name),
            ExprKind::ArrayLiteral(elements) => elements.iter().any(|e| e.reads_variable(name)),
            ExprKind::IntLiteral(_)
            | ExprKind::FloatLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::CharLiteral(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::InterpolatedString(_)
            | ExprKind::NullLiteral
            | ExprKind::ClassRef(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    // Literals
    IntLiteral(i64),
    FloatLiteral(f64),
    BoolLiteral(bool),
    CharLiteral(char),
    StringLiteral(String),
    /// String whose contents are emitted as written (no escape processing).
    InterpolatedString(String),
    NullLiteral,

    // Variables
    Identifier(String),

    /// Call of a free function by name: `name(args)`
    Call(Box<CallExpr>),

    /// Property read: `object.field`
    FieldAccess(Box<FieldAccessExpr>),

    /// Array literal: [1, 2, 3]
    ArrayLiteral(Vec<Expr>),

    /// Reference to a class by name, e.g. the target of `new` or `instanceof`.
    ClassRef(String),
}

/// Function call
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: String,
    pub args: Vec<Expr>,
}

/// Field access expression: expr.field
#[derive(Debug, Clone)]
pub struct FieldAccessExpr {
    pub object: Expr,
    pub field: String,
    pub field_span: Span,
}
