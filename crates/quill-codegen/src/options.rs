//! Code emission options.
//!
//! Options are plain data, usually read from a TOML file. Fields omitted
//! from the file inherit the `Default` values.

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    /// Replace calls to well-known built-ins with specialized kernel calls.
    pub call_optimizers: bool,
    /// Built-ins that always take the generic call path.
    pub disabled_optimizers: Vec<String>,
    /// Host ABI generation to address slots for.
    pub backend: BackendKind,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            call_optimizers: true,
            disabled_optimizers: Vec::new(),
            backend: BackendKind::default(),
        }
    }
}

impl CodegenOptions {
    /// Every call goes through the generic path.
    pub fn unoptimized() -> Self {
        Self {
            call_optimizers: false,
            ..Self::default()
        }
    }

    /// Whether the optimizers registered for `function` may run.
    pub fn optimizer_enabled(&self, function: &str) -> bool {
        self.call_optimizers && !self.disabled_optimizers.iter().any(|name| name == function)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let options = CodegenOptions::from_toml_str("").unwrap();
        assert_eq!(options, CodegenOptions::default());
        assert!(options.optimizer_enabled("microtime"));
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let options = CodegenOptions::from_toml_str(
            r#"
            disabled_optimizers = ["microtime"]
            backend = "pointer"
            "#,
        )
        .unwrap();
        assert!(options.call_optimizers);
        assert!(!options.optimizer_enabled("microtime"));
        assert!(options.optimizer_enabled("file_get_contents"));
        assert_eq!(options.backend, BackendKind::Pointer);
    }

    #[test]
    fn unoptimized_disables_every_optimizer() {
        let options = CodegenOptions::unoptimized();
        assert!(!options.optimizer_enabled("file_get_contents"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(CodegenOptions::from_toml_str(r#"backend = "bytecode""#).is_err());
    }
}
