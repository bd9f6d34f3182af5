//! Quill code emission: lowers routine bodies to the host extension ABI's
//! instruction vocabulary.

mod backend;
mod calls;
mod context;
pub mod errors;
mod expr;
pub mod instr;
pub mod optimizers;
mod options;
mod routine;
mod runtime_registry;
pub mod stmt;
mod symbols;
mod types;
mod unit;

pub use backend::{BackendKind, HostBackend, InlineBackend, PointerBackend, escape_c_string};
pub use calls::Call;
pub use context::{CompilationContext, HeaderSet};
pub use expr::{Expectation, resolve};
pub use instr::{ArgVec, Instruction, InstructionBuffer, Operand, listing};
pub use optimizers::{
    FunctionOptimizer, GenericCallPath, Optimized, OptimizerRegistry,
};
pub use options::CodegenOptions;
pub use routine::{ClassDefinition, ReturnCategory, ReturnTypeFlags, RoutineContract};
pub use runtime_registry::{NativeOp, RuntimeModule};
pub use symbols::{
    RECEIVER, RETURN_VALUE, ReturnOwnership, StorageClass, SymbolTable, SymbolVariable,
};
pub use types::{CompiledExpression, ExprType, VarType};
pub use unit::{CompilationUnit, CompiledUnit, compile_unit};

// Error types
pub use errors::{CodegenError, CodegenErrorKind, CodegenResult, ErrorClass};
