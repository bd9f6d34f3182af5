// src/unit.rs
//
// Unit driver: compiles one routine body into its instruction stream.

use quill_frontend::Block;

use crate::context::CompilationContext;
use crate::errors::CodegenResult;
use crate::instr::{Instruction, listing};
use crate::optimizers::{GenericCallPath, OptimizerRegistry};
use crate::options::CodegenOptions;
use crate::routine::{ClassDefinition, RoutineContract};
use crate::runtime_registry::RuntimeModule;
use crate::symbols::StorageClass;
use crate::types::VarType;

/// One routine body together with the facts its compilation needs.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub routine: RoutineContract,
    pub class: Option<ClassDefinition>,
    /// Parameter names. Parameters are dynamic slots borrowed from the caller.
    pub params: Vec<String>,
    pub body: Block,
}

impl CompilationUnit {
    pub fn new(routine: RoutineContract, body: Block) -> Self {
        Self {
            routine,
            class: None,
            params: Vec::new(),
            body,
        }
    }

    pub fn with_class(mut self, class: ClassDefinition) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }
}

/// Output of a successfully compiled unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    pub instructions: Vec<Instruction>,
    /// Kernel modules the generated code must include, sorted.
    pub headers: Vec<RuntimeModule>,
}

impl CompiledUnit {
    /// Instruction listing, one per line.
    pub fn listing(&self) -> String {
        listing(&self.instructions)
    }
}

/// Compile `unit` in a fresh context.
///
/// A body that does not end in a return gets a trailing `RETURN_NONE`. On
/// error nothing is returned: the partial instruction buffer is dropped with
/// the context.
#[tracing::instrument(skip_all, fields(routine = %unit.routine.name))]
pub fn compile_unit(
    unit: &CompilationUnit,
    registry: &OptimizerRegistry,
    generic: &dyn GenericCallPath,
    options: &CodegenOptions,
) -> CodegenResult<CompiledUnit> {
    let mut ctx = CompilationContext::new(unit.routine.clone(), registry, generic, options.clone());
    if let Some(class) = &unit.class {
        ctx = ctx.with_class(class.clone());
    }

    let result = compile_body(&mut ctx, unit);
    if let Err(err) = &result {
        tracing::debug!(error = %err, "unit aborted");
    }
    result?;

    let (instructions, headers) = ctx.finish();
    tracing::debug!(
        instructions = instructions.len(),
        headers = headers.len(),
        "unit compiled"
    );
    Ok(CompiledUnit {
        instructions,
        headers,
    })
}

fn compile_body(ctx: &mut CompilationContext<'_>, unit: &CompilationUnit) -> CodegenResult<()> {
    for param in &unit.params {
        ctx.declare_or_get_variable(param, VarType::Variable, StorageClass::External)?
            .set_initialized(true);
    }
    if !ctx.block(&unit.body)? {
        ctx.emit(Instruction::ReturnNone);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizers::tests::RecordingGenericPath;
    use quill_frontend::AstBuilder;

    #[test]
    fn falling_off_the_end_returns_none() {
        let b = AstBuilder::new();
        let unit = CompilationUnit::new(
            RoutineContract::new("m"),
            Block {
                stmts: vec![b.let_("x", quill_frontend::TypeHint::Int, Some(b.int(1)))],
                ..Block::default()
            },
        );
        let generic = RecordingGenericPath::default();
        let compiled = compile_unit(
            &unit,
            &OptimizerRegistry::empty(),
            &generic,
            &CodegenOptions::default(),
        )
        .unwrap();
        assert_eq!(compiled.listing(), "ASSIGN(&x, int:1)\nRETURN_NONE\n");
    }

    #[test]
    fn parameters_are_borrowed_slots() {
        let b = AstBuilder::new();
        let unit = CompilationUnit::new(
            RoutineContract::new("m"),
            Block {
                stmts: vec![b.ret_value(b.var("input"))],
                ..Block::default()
            },
        )
        .with_params(["input"]);
        let generic = RecordingGenericPath::default();
        let compiled = compile_unit(
            &unit,
            &OptimizerRegistry::empty(),
            &generic,
            &CodegenOptions::default(),
        )
        .unwrap();
        assert_eq!(
            compiled.instructions,
            vec![
                Instruction::RetvalCopy("&input".into()),
                Instruction::ReturnFinalize,
            ]
        );
    }

    #[test]
    fn error_yields_no_output() {
        let b = AstBuilder::new();
        let unit = CompilationUnit::new(
            RoutineContract::constructor("__construct"),
            Block {
                stmts: vec![
                    b.let_("x", quill_frontend::TypeHint::Int, Some(b.int(1))),
                    b.ret_value(b.int(1)),
                ],
                ..Block::default()
            },
        );
        let generic = RecordingGenericPath::default();
        let result = compile_unit(
            &unit,
            &OptimizerRegistry::empty(),
            &generic,
            &CodegenOptions::default(),
        );
        assert!(result.is_err());
    }
}
