// src/config.rs
//! Loading `CodegenOptions` from disk.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use quill_codegen::CodegenOptions;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum OptionsError {
    #[error("failed to read options file '{}'", .path.display())]
    #[diagnostic(code(E0001))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options file '{}': {source}", .path.display())]
    #[diagnostic(code(E0002))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Read code emission options from a TOML file.
///
/// Keys missing from the file keep their default values.
pub fn load_options(path: impl AsRef<Path>) -> Result<CodegenOptions, OptionsError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let options = CodegenOptions::from_toml_str(&text).map_err(|source| OptionsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), ?options, "loaded codegen options");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_codegen::BackendKind;
    use std::io::Write;

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend = \"pointer\"").unwrap();
        writeln!(file, "disabled_optimizers = [\"strtolower\"]").unwrap();

        let options = load_options(file.path()).unwrap();
        assert_eq!(options.backend, BackendKind::Pointer);
        assert!(!options.optimizer_enabled("strtolower"));
        assert!(options.optimizer_enabled("microtime"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");
        let err = load_options(&path).unwrap_err();
        assert!(matches!(err, OptionsError::Io { .. }));
        assert!(err.to_string().contains("quill.toml"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "call_optimizers = \"yes\"").unwrap();
        let err = load_options(file.path()).unwrap_err();
        assert!(matches!(err, OptionsError::Parse { .. }));
        assert_eq!(err.code().unwrap().to_string(), "E0002");
    }
}
