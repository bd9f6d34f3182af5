// src/instr.rs
//
// Instruction vocabulary handed to the generation backend, and the
// append-only buffer a unit emits into.

use smallvec::SmallVec;
use std::fmt;

use crate::runtime_registry::{NativeOp, RuntimeModule};
use crate::types::{CompiledExpression, ExprType};

/// A typed value written into a slot by `ASSIGN` or `ARRAY_APPEND`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub kind: ExprType,
    pub code: String,
}

impl Operand {
    pub fn new(kind: ExprType, code: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
        }
    }
}

impl From<&CompiledExpression> for Operand {
    fn from(expr: &CompiledExpression) -> Self {
        let code = match expr.kind {
            ExprType::Bool => expr.boolean_code().to_string(),
            _ => expr.code.clone(),
        };
        Operand::new(expr.kind, code)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ExprType::String | ExprType::IString => write!(f, "{}:\"{}\"", self.kind.name(), self.code),
            _ => write!(f, "{}:{}", self.kind.name(), self.code),
        }
    }
}

/// Argument list of a specialized call.
pub type ArgVec = SmallVec<[String; 2]>;

/// One logical operation of the host runtime's extension ABI.
///
/// Handles are backend-rendered slot references (see `HostBackend`).
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Return null.
    ReturnNone,
    ReturnLong(String),
    ReturnDouble(String),
    ReturnBool(String),
    /// Return a string literal; the payload is already escaped.
    ReturnString(String),
    /// Copy-construct the slot into the return value and return.
    ReturnCopy(String),
    /// The return value slot already holds the result.
    ReturnFinalize,
    ReturnReceiver,
    /// Move a local-only slot into the return value without a refcount bump.
    ReturnLocalTransfer(String),
    /// Copy-return keeping the slot's reference count balanced.
    ReturnRefcountPreserve(String),
    /// Read a declared property of the receiver straight into the return value.
    ReturnMember(String),
    /// Copy a borrowed slot into the return value (adding a reference).
    RetvalCopy(String),
    /// First allocation of a variant slot.
    InitVariant(String),
    /// Release and re-allocate a variant slot that was initialized before.
    ReinitVariant(String),
    ArrayInit { handle: String, size: usize },
    ArrayAppend { handle: String, value: Operand },
    Assign { handle: String, value: Operand },
    /// Direct call of a native kernel routine replacing a dynamic call.
    CallSpecialized {
        module: RuntimeModule,
        op: NativeOp,
        dest: Option<String>,
        args: ArgVec,
    },
}

impl Instruction {
    /// Whether this instruction leaves the routine.
    pub fn is_return(&self) -> bool {
        matches!(
            self,
            Instruction::ReturnNone
                | Instruction::ReturnLong(_)
                | Instruction::ReturnDouble(_)
                | Instruction::ReturnBool(_)
                | Instruction::ReturnString(_)
                | Instruction::ReturnCopy(_)
                | Instruction::ReturnFinalize
                | Instruction::ReturnReceiver
                | Instruction::ReturnLocalTransfer(_)
                | Instruction::ReturnRefcountPreserve(_)
                | Instruction::ReturnMember(_)
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::ReturnNone => write!(f, "RETURN_NONE"),
            Instruction::ReturnLong(v) => write!(f, "RETURN_LONG({})", v),
            Instruction::ReturnDouble(v) => write!(f, "RETURN_DOUBLE({})", v),
            Instruction::ReturnBool(v) => write!(f, "RETURN_BOOL({})", v),
            Instruction::ReturnString(v) => write!(f, "RETURN_STRING(\"{}\")", v),
            Instruction::ReturnCopy(h) => write!(f, "RETURN_COPY({})", h),
            Instruction::ReturnFinalize => write!(f, "RETURN_FINALIZE()"),
            Instruction::ReturnReceiver => write!(f, "RETURN_RECEIVER()"),
            Instruction::ReturnLocalTransfer(h) => write!(f, "RETURN_LOCAL_TRANSFER({})", h),
            Instruction::ReturnRefcountPreserve(h) => {
                write!(f, "RETURN_REFCOUNT_PRESERVE({})", h)
            }
            Instruction::ReturnMember(p) => write!(f, "RETURN_MEMBER(\"{}\")", p),
            Instruction::RetvalCopy(h) => write!(f, "RETVAL_COPY({})", h),
            Instruction::InitVariant(h) => write!(f, "INIT_VARIANT({})", h),
            Instruction::ReinitVariant(h) => write!(f, "REINIT_VARIANT({})", h),
            Instruction::ArrayInit { handle, size } => write!(f, "ARRAY_INIT({}, {})", handle, size),
            Instruction::ArrayAppend { handle, value } => {
                write!(f, "ARRAY_APPEND({}, {})", handle, value)
            }
            Instruction::Assign { handle, value } => write!(f, "ASSIGN({}, {})", handle, value),
            Instruction::CallSpecialized {
                module,
                op,
                dest,
                args,
            } => {
                write!(
                    f,
                    "CALL_SPECIALIZED({}, {}, {}",
                    module,
                    op,
                    dest.as_deref().unwrap_or("NULL")
                )?;
                for arg in args {
                    write!(f, ", {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Ordered, append-only output of one unit.
#[derive(Debug, Default)]
pub struct InstructionBuffer {
    instructions: Vec<Instruction>,
}

impl InstructionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instruction: Instruction) {
        tracing::trace!(%instruction, "emit");
        self.instructions.push(instruction);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn last(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    pub fn into_vec(self) -> Vec<Instruction> {
        self.instructions
    }
}

/// Render a listing, one instruction per line.
pub fn listing(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}
