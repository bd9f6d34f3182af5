// tests/pipeline.rs
//! Options file to compiled unit, through the public facade.

use std::io::Write;

use quill::codegen::{Call, CodegenResult, CompilationContext, CompiledExpression, RoutineContract};
use quill::frontend::{AstBuilder, Block, Expr, Stmt, TypeHint};
use quill::{CompilationUnit, GenericCallPath, OptimizerRegistry, compile_unit, load_options};

struct NullGenericPath;

impl GenericCallPath for NullGenericPath {
    fn compile_call(
        &self,
        expr: &Expr,
        _call: &mut Call<'_>,
        _ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression> {
        Ok(CompiledExpression::null(expr))
    }
}

fn block(stmts: Vec<Stmt>) -> Block {
    Block {
        stmts,
        ..Block::default()
    }
}

fn options_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn options_file_disables_named_optimizer() {
    quill::init_tracing();
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("now"),
        block(vec![b.ret_value(b.call("microtime", vec![]))]),
    );

    let file = options_file("disabled_optimizers = [\"microtime\"]\n");
    let options = load_options(file.path()).unwrap();
    let compiled = compile_unit(&unit, OptimizerRegistry::builtin(), &NullGenericPath, &options)
        .unwrap();
    assert_eq!(compiled.listing(), "RETURN_NONE\n");

    let file = options_file("");
    let options = load_options(file.path()).unwrap();
    let compiled = compile_unit(&unit, OptimizerRegistry::builtin(), &NullGenericPath, &options)
        .unwrap();
    assert!(compiled.listing().contains("kernel_microtime"));
}

#[test]
fn contract_violation_renders_with_source() {
    let source = "fn size() -> int {\n    let s: string = \"x\";\n    return s;\n}\n";
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::from_return_hints("size", &[TypeHint::Int]),
        block(vec![
            b.let_("s", TypeHint::String, Some(b.string("x"))),
            b.at(3).ret_value(b.var("s")),
        ]),
    );
    let err = compile_unit(
        &unit,
        OptimizerRegistry::builtin(),
        &NullGenericPath,
        &quill::CodegenOptions::default(),
    )
    .unwrap_err();
    let report = quill::report(err, "size.quill", source);
    assert_eq!(report.code().unwrap().to_string(), "E3205");
    assert!(report.to_string().contains("string"));
}
