// src/backend.rs
//
// Host-return abstraction: how slots are addressed and how string literals
// are returned under a given host ABI generation.

use serde::{Deserialize, Serialize};

use crate::instr::Instruction;
use crate::symbols::SymbolVariable;

/// Low-level slot addressing and return operations of the host ABI.
pub trait HostBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Handle that kernel routines receive for `variable`.
    fn variable_handle(&self, variable: &SymbolVariable) -> String;

    /// Instruction returning an already escaped string literal.
    fn return_string(&self, escaped: String) -> Instruction {
        Instruction::ReturnString(escaped)
    }
}

/// Values embedded in the frame; kernel routines take their address.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineBackend;

impl HostBackend for InlineBackend {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn variable_handle(&self, variable: &SymbolVariable) -> String {
        format!("&{}", variable.name())
    }
}

/// Values held through pointers; the slot name is already the handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerBackend;

impl HostBackend for PointerBackend {
    fn name(&self) -> &'static str {
        "pointer"
    }

    fn variable_handle(&self, variable: &SymbolVariable) -> String {
        variable.name().to_string()
    }
}

/// Backend selection in `CodegenOptions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Inline,
    Pointer,
}

impl BackendKind {
    pub fn instantiate(self) -> Box<dyn HostBackend> {
        match self {
            BackendKind::Inline => Box::new(InlineBackend),
            BackendKind::Pointer => Box::new(PointerBackend),
        }
    }
}

/// Escape a string literal for embedding in a C string.
///
/// Escape sequences already present in the source text are kept as written.
pub fn escape_c_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next @ ('\\' | '"' | 'n' | 'r' | 't' | '0' | 'x' | 'e' | 'v' | 'f')) => {
                    out.push('\\');
                    out.push(next);
                    chars.next();
                }
                _ => out.push_str("\\\\"),
            },
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
