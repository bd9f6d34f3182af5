// src/report.rs

use miette::NamedSource;
use quill_codegen::CodegenError;

/// Attach the unit's source text to a code emission error for rendering.
pub fn report(err: CodegenError, file_path: &str, source: &str) -> miette::Report {
    miette::Report::new(err).with_source_code(NamedSource::new(file_path, source.to_string()))
}
