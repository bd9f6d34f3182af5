// src/builder.rs
//
// Programmatic construction of input trees. Node ids are allocated
// sequentially; spans are synthetic unless set with `at`.

use std::cell::Cell;

use quill_identity::{NodeId, Span};

use crate::ast::{
    CallExpr, Expr, ExprKind, ExprStmt, FieldAccessExpr, LetStmt, RECEIVER_NAME, ReturnStmt, Stmt,
    TypeHint,
};

/// Allocates node ids while building expressions and statements.
#[derive(Debug, Default)]
pub struct AstBuilder {
    next_id: Cell<u32>,
    line: Cell<u32>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            line: Cell::new(1),
        }
    }

    /// Subsequent nodes are placed on `line`.
    pub fn at(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    fn span(&self, id: u32) -> Span {
        let start = id as usize;
        Span::new(start, start + 1, self.line.get(), 1)
    }

    pub fn expr(&self, kind: ExprKind) -> Expr {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Expr {
            id: NodeId::new(id),
            kind,
            span: self.span(id),
        }
    }

    pub fn int(&self, value: i64) -> Expr {
        self.expr(ExprKind::IntLiteral(value))
    }

    pub fn double(&self, value: f64) -> Expr {
        self.expr(ExprKind::FloatLiteral(value))
    }

    pub fn bool(&self, value: bool) -> Expr {
        self.expr(ExprKind::BoolLiteral(value))
    }

    pub fn char(&self, value: char) -> Expr {
        self.expr(ExprKind::CharLiteral(value))
    }

    pub fn string(&self, value: &str) -> Expr {
        self.expr(ExprKind::StringLiteral(value.to_string()))
    }

    pub fn istring(&self, value: &str) -> Expr {
        self.expr(ExprKind::InterpolatedString(value.to_string()))
    }

    pub fn null(&self) -> Expr {
        self.expr(ExprKind::NullLiteral)
    }

    pub fn var(&self, name: &str) -> Expr {
        self.expr(ExprKind::Identifier(name.to_string()))
    }

    pub fn this(&self) -> Expr {
        self.var(RECEIVER_NAME)
    }

    pub fn class_ref(&self, name: &str) -> Expr {
        self.expr(ExprKind::ClassRef(name.to_string()))
    }

    pub fn array(&self, elements: Vec<Expr>) -> Expr {
        self.expr(ExprKind::ArrayLiteral(elements))
    }

    pub fn call(&self, callee: &str, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call(Box::new(CallExpr {
            callee: callee.to_string(),
            args,
        })))
    }

    pub fn field(&self, object: Expr, field: &str) -> Expr {
        let field_span = object.span;
        self.expr(ExprKind::FieldAccess(Box::new(FieldAccessExpr {
            object,
            field: field.to_string(),
            field_span,
        })))
    }

    pub fn this_field(&self, field: &str) -> Expr {
        self.field(self.this(), field)
    }

    pub fn ret(&self, value: Option<Expr>) -> Stmt {
        let span = value.as_ref().map(|v| v.span).unwrap_or_default();
        Stmt::Return(ReturnStmt { value, span })
    }

    pub fn ret_value(&self, value: Expr) -> Stmt {
        self.ret(Some(value))
    }

    pub fn let_(&self, name: &str, ty: TypeHint, init: Option<Expr>) -> Stmt {
        let span = init.as_ref().map(|v| v.span).unwrap_or_default();
        Stmt::Let(LetStmt {
            name: name.to_string(),
            ty,
            init,
            span,
        })
    }

    pub fn expr_stmt(&self, expr: Expr) -> Stmt {
        let span = expr.span;
        Stmt::Expr(ExprStmt { expr, span })
    }
}
