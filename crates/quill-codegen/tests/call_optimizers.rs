// tests/call_optimizers.rs
//! Built-in call specialization through whole-unit compilation.

mod common;

use common::{RecordingGenericPath, block, compile, lines};
use quill_codegen::{
    BackendKind, CodegenOptions, CompilationUnit, OptimizerRegistry, RoutineContract,
    RuntimeModule, compile_unit,
};
use quill_frontend::{AstBuilder, TypeHint};

#[test]
fn content_read_returns_through_return_value() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("load"),
        block(vec![b.ret_value(b.call("file_get_contents", vec![b.var("path")]))]),
    )
    .with_params(["path"]);
    let generic = RecordingGenericPath::default();
    let compiled = compile(&unit, &generic).unwrap();

    assert_eq!(
        lines(&compiled),
        vec![
            "CALL_SPECIALIZED(kernel/file, kernel_file_get_contents, &return_value, &path)",
            "RETURN_FINALIZE()",
        ]
    );
    assert_eq!(compiled.headers, vec![RuntimeModule::File]);
    assert!(generic.calls().is_empty());
}

#[test]
fn content_read_discards_result_in_statement_position() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("touch"),
        block(vec![b.expr_stmt(
            b.call("file_get_contents", vec![b.string("/etc/hosts")]),
        )]),
    );
    let generic = RecordingGenericPath::default();
    let compiled = compile(&unit, &generic).unwrap();
    assert_eq!(
        lines(&compiled),
        vec![
            "CALL_SPECIALIZED(kernel/file, kernel_file_get_contents, NULL, \"/etc/hosts\")",
            "RETURN_NONE",
        ]
    );
}

#[test]
fn content_read_into_integer_is_an_error() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("bad"),
        block(vec![b.let_(
            "n",
            TypeHint::Int,
            Some(b.call("file_get_contents", vec![b.string("a")])),
        )]),
    );
    let generic = RecordingGenericPath::default();
    let err = compile(&unit, &generic).unwrap_err();
    assert!(err.is_compiler_error());
    assert!(err.to_string().contains("file_get_contents"));
}

#[test]
fn timestamp_into_local_then_returned() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("now"),
        block(vec![
            b.let_("t", TypeHint::Var, Some(b.call("microtime", vec![]))),
            b.ret_value(b.var("t")),
        ]),
    );
    let generic = RecordingGenericPath::default();
    let compiled = compile(&unit, &generic).unwrap();
    assert_eq!(
        lines(&compiled),
        vec![
            "INIT_VARIANT(&t)",
            "CALL_SPECIALIZED(kernel/time, kernel_microtime, &t)",
            "RETURN_REFCOUNT_PRESERVE(&t)",
        ]
    );
    assert_eq!(
        compiled.headers,
        vec![RuntimeModule::Memory, RuntimeModule::Time]
    );
}

#[test]
fn timestamp_with_three_arguments_takes_generic_path() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("odd"),
        block(vec![b.expr_stmt(b.call(
            "microtime",
            vec![b.bool(true), b.int(0), b.int(0)],
        ))]),
    );
    let generic = RecordingGenericPath::default();
    let compiled = compile(&unit, &generic).unwrap();
    assert_eq!(generic.calls(), vec!["microtime".to_string()]);
    assert_eq!(lines(&compiled), vec!["RETURN_NONE"]);
}

#[test]
fn unregistered_builtin_falls_back_exactly_once() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("len"),
        block(vec![b.ret_value(b.call("strlen", vec![b.var("s")]))]),
    )
    .with_params(["s"]);
    let generic = RecordingGenericPath::default();
    let compiled = compile(&unit, &generic).unwrap();
    assert_eq!(generic.calls(), vec!["strlen".to_string()]);
    assert_eq!(lines(&compiled), vec!["RETURN_FINALIZE()"]);
}

#[test]
fn destination_read_by_argument_goes_through_temporary() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("lower"),
        block(vec![
            b.let_("p", TypeHint::Var, Some(b.string("A"))),
            b.let_("p", TypeHint::Var, Some(b.call("strtolower", vec![b.var("p")]))),
            b.ret_value(b.var("p")),
        ]),
    );
    let generic = RecordingGenericPath::default();
    let compiled = compile(&unit, &generic).unwrap();
    assert_eq!(
        lines(&compiled),
        vec![
            "INIT_VARIANT(&p)",
            "ASSIGN(&p, string:\"A\")",
            "INIT_VARIANT(&_0)",
            "CALL_SPECIALIZED(kernel/string, kernel_fast_strtolower, &_0, &p)",
            "REINIT_VARIANT(&p)",
            "ASSIGN(&p, variable:&_0)",
            "RETURN_REFCOUNT_PRESERVE(&p)",
        ]
    );
}

#[test]
fn disabled_optimizers_route_to_generic_path() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("now"),
        block(vec![b.ret_value(b.call("microtime", vec![]))]),
    );
    let generic = RecordingGenericPath::default();
    let compiled = compile_unit(
        &unit,
        OptimizerRegistry::builtin(),
        &generic,
        &CodegenOptions::unoptimized(),
    )
    .unwrap();
    assert_eq!(generic.calls(), vec!["microtime".to_string()]);
    assert!(!compiled.headers.contains(&RuntimeModule::Time));
}

#[test]
fn pointer_backend_renders_bare_handles() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("save"),
        block(vec![b.expr_stmt(b.call(
            "file_put_contents",
            vec![b.string("out.txt"), b.var("data")],
        ))]),
    )
    .with_params(["data"]);
    let generic = RecordingGenericPath::default();
    let options = CodegenOptions {
        backend: BackendKind::Pointer,
        ..CodegenOptions::default()
    };
    let compiled = compile_unit(&unit, OptimizerRegistry::builtin(), &generic, &options).unwrap();
    assert_eq!(
        lines(&compiled)[0],
        "CALL_SPECIALIZED(kernel/file, kernel_file_put_contents, NULL, \"out.txt\", data)"
    );
}

#[test]
fn dispatch_is_deterministic() {
    let b = AstBuilder::new();
    let unit = CompilationUnit::new(
        RoutineContract::new("now"),
        block(vec![b.ret_value(b.call("microtime", vec![b.bool(true)]))]),
    );
    let first = compile(&unit, &RecordingGenericPath::default()).unwrap();
    for _ in 0..4 {
        assert_eq!(compile(&unit, &RecordingGenericPath::default()).unwrap(), first);
    }
}
