//! Quill input tree.
//!
//! The parser that produces these nodes lives outside this workspace; the
//! code emitter consumes them read-only.

pub mod ast;
pub mod builder;

pub use ast::{
    Block, CallExpr, Expr, ExprKind, ExprStmt, FieldAccessExpr, LetStmt, RECEIVER_NAME, ReturnStmt,
    Stmt, TypeHint,
};
pub use builder::AstBuilder;
pub use quill_identity::{NodeId, Span};
