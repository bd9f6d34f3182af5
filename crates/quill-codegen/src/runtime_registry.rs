//! Typed registry of host kernel modules and the native operations they export.
//!
//! Emitted code refers to kernel routines only through these keys; the
//! external generation backend maps them to header includes and symbols.

/// A kernel module the generated unit must include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuntimeModule {
    Memory,
    Object,
    Array,
    File,
    Time,
    String,
}

impl RuntimeModule {
    pub const ALL: &'static [RuntimeModule] = &[
        RuntimeModule::Memory,
        RuntimeModule::Object,
        RuntimeModule::Array,
        RuntimeModule::File,
        RuntimeModule::Time,
        RuntimeModule::String,
    ];

    /// Opaque module identifier handed to the build stage.
    pub fn id(self) -> &'static str {
        match self {
            RuntimeModule::Memory => "kernel/memory",
            RuntimeModule::Object => "kernel/object",
            RuntimeModule::Array => "kernel/array",
            RuntimeModule::File => "kernel/file",
            RuntimeModule::Time => "kernel/time",
            RuntimeModule::String => "kernel/string",
        }
    }
}

impl std::fmt::Display for RuntimeModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Native kernel operation targeted by a specialized call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeOp {
    FileGetContents,
    FilePutContents,
    Microtime,
    FastStrToLower,
    FastStrToUpper,
}

impl NativeOp {
    pub const ALL: &'static [NativeOp] = &[
        NativeOp::FileGetContents,
        NativeOp::FilePutContents,
        NativeOp::Microtime,
        NativeOp::FastStrToLower,
        NativeOp::FastStrToUpper,
    ];

    /// Kernel symbol implementing this operation.
    pub fn c_name(self) -> &'static str {
        match self {
            NativeOp::FileGetContents => "kernel_file_get_contents",
            NativeOp::FilePutContents => "kernel_file_put_contents",
            NativeOp::Microtime => "kernel_microtime",
            NativeOp::FastStrToLower => "kernel_fast_strtolower",
            NativeOp::FastStrToUpper => "kernel_fast_strtoupper",
        }
    }

    /// Module that must be included for this operation to link.
    pub fn module(self) -> RuntimeModule {
        match self {
            NativeOp::FileGetContents | NativeOp::FilePutContents => RuntimeModule::File,
            NativeOp::Microtime => RuntimeModule::Time,
            NativeOp::FastStrToLower | NativeOp::FastStrToUpper => RuntimeModule::String,
        }
    }
}

impl std::fmt::Display for NativeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.c_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn native_symbol_names_are_unique() {
        let mut seen = FxHashSet::default();
        for op in NativeOp::ALL {
            assert!(
                seen.insert(op.c_name()),
                "duplicate kernel symbol name: {}",
                op
            );
        }
    }

    #[test]
    fn module_ids_are_unique() {
        let mut seen = FxHashSet::default();
        for module in RuntimeModule::ALL {
            assert!(seen.insert(module.id()), "duplicate module id: {}", module);
        }
    }

    #[test]
    fn ops_name_their_module() {
        assert_eq!(NativeOp::FileGetContents.module(), RuntimeModule::File);
        assert_eq!(NativeOp::Microtime.module(), RuntimeModule::Time);
        assert_eq!(NativeOp::Microtime.c_name(), "kernel_microtime");
    }
}
