// src/expr.rs
//
// Expression resolution: turns an expression tree into a CompiledExpression,
// emitting whatever instructions its evaluation needs.
//
// Resolution is read-only with respect to its inputs. The only slots written
// are the expected target (when the caller names one) and fresh temporaries.

use quill_frontend::{Expr, ExprKind, RECEIVER_NAME};

use crate::calls::Call;
use crate::context::CompilationContext;
use crate::errors::{CodegenError, CodegenResult};
use crate::instr::{Instruction, Operand};
use crate::runtime_registry::RuntimeModule;
use crate::symbols::RECEIVER;
use crate::types::{CompiledExpression, ExprType, VarType};

/// Where the caller would like the value to end up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectation {
    target: Option<String>,
}

impl Expectation {
    /// The value may live anywhere.
    pub fn none() -> Self {
        Self::default()
    }

    /// Write the value straight into slot `name` when the expression allows it.
    pub fn into_slot(name: impl Into<String>) -> Self {
        Self {
            target: Some(name.into()),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// Resolve `expr`, attaching its span to any error raised below it.
#[tracing::instrument(level = "trace", skip_all, fields(node = %expr.id))]
pub fn resolve(
    expr: &Expr,
    expect: &Expectation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<CompiledExpression> {
    resolve_kind(expr, expect, ctx).map_err(|err| err.with_span(expr.span))
}

fn resolve_kind(
    expr: &Expr,
    expect: &Expectation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<CompiledExpression> {
    Ok(match &expr.kind {
        ExprKind::IntLiteral(value) => CompiledExpression::new(ExprType::Int, value.to_string(), expr),
        ExprKind::FloatLiteral(value) => {
            CompiledExpression::new(ExprType::Double, format!("{value:?}"), expr)
        }
        ExprKind::BoolLiteral(value) => {
            CompiledExpression::new(ExprType::Bool, value.to_string(), expr)
        }
        ExprKind::CharLiteral(value) => {
            CompiledExpression::new(ExprType::Char, char_code(*value), expr)
        }
        ExprKind::StringLiteral(value) => {
            CompiledExpression::new(ExprType::String, value.as_str(), expr)
        }
        ExprKind::InterpolatedString(value) => {
            CompiledExpression::new(ExprType::IString, value.as_str(), expr)
        }
        ExprKind::NullLiteral => CompiledExpression::null(expr),
        ExprKind::Identifier(name) => {
            let slot = if name == RECEIVER_NAME { RECEIVER } else { name.as_str() };
            let variable = ctx.symbols.variable_for_read(slot)?;
            CompiledExpression::variable(variable.name(), expr)
        }
        ExprKind::Call(call_expr) => {
            let mut call = Call::new(call_expr, expect.target());
            return ctx.registry().dispatch(expr, &mut call, ctx);
        }
        ExprKind::ArrayLiteral(elements) => resolve_array(expr, elements, expect, ctx)?,
        ExprKind::ClassRef(name) => {
            CompiledExpression::new(ExprType::ClassEntry, class_entry_symbol(name), expr)
        }
        ExprKind::FieldAccess(access) => {
            return Err(CodegenError::unsupported_with_context(
                "property access",
                format!(
                    "reading '{}' is only lowered as `return this.{}`",
                    access.field, access.field
                ),
            ));
        }
    })
}

/// Build an array literal in the expected slot, or in a temporary.
fn resolve_array(
    expr: &Expr,
    elements: &[Expr],
    expect: &Expectation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<CompiledExpression> {
    let in_place = expect.target().filter(|target| {
        !elements.iter().any(|element| element.reads_variable(target))
            && ctx
                .symbols
                .get(target)
                .is_some_and(|slot| matches!(slot.ty(), VarType::Variable | VarType::Array))
    });
    let target = match in_place {
        Some(target) => target.to_string(),
        None => ctx
            .symbols
            .temp_variable_for_write(VarType::Variable)
            .name()
            .to_string(),
    };

    ctx.require_header(RuntimeModule::Array);
    ctx.init_variant(&target)?;
    let handle = ctx.variable_handle(&target)?;
    ctx.emit(Instruction::ArrayInit {
        handle: handle.clone(),
        size: elements.len(),
    });
    for element in elements {
        let value = resolve(element, &Expectation::none(), ctx)?;
        let value = operand_for(&value, ctx)?;
        ctx.emit(Instruction::ArrayAppend {
            handle: handle.clone(),
            value,
        });
    }
    if let Some(slot) = ctx.symbols.get_mut(&target) {
        slot.widen_dynamic_type(VarType::Array);
    }
    Ok(CompiledExpression::new(ExprType::Array, target, expr))
}

/// Operand for storing `value` into another slot. Slot references are
/// rendered as backend handles.
pub(crate) fn operand_for(
    value: &CompiledExpression,
    ctx: &CompilationContext<'_>,
) -> CodegenResult<Operand> {
    match value.kind {
        ExprType::Variable | ExprType::Array => Ok(Operand::new(
            value.kind,
            ctx.variable_handle(&value.code)?,
        )),
        _ => Ok(Operand::from(value)),
    }
}

fn char_code(value: char) -> String {
    match value {
        '\'' => "'\\''".to_string(),
        '\\' => "'\\\\'".to_string(),
        '\n' => "'\\n'".to_string(),
        '\t' => "'\\t'".to_string(),
        other => format!("'{other}'"),
    }
}

/// Symbol of the class entry handle for a (possibly namespaced) class name.
fn class_entry_symbol(name: &str) -> String {
    let mut symbol = name.trim_start_matches('\\').replace('\\', "_").to_lowercase();
    symbol.push_str("_ce");
    symbol
}
