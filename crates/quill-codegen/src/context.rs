// src/context.rs
//
// Per-unit compilation state. One context lives for exactly one unit; it is
// threaded by `&mut` through every resolution, optimizer and statement call.

use rustc_hash::FxHashSet;

use crate::backend::HostBackend;
use crate::errors::{CodegenError, CodegenResult};
use crate::instr::{Instruction, InstructionBuffer};
use crate::optimizers::{GenericCallPath, OptimizerRegistry};
use crate::options::CodegenOptions;
use crate::routine::{ClassDefinition, RoutineContract};
use crate::runtime_registry::RuntimeModule;
use crate::symbols::{RECEIVER, RETURN_VALUE, StorageClass, SymbolTable, SymbolVariable};
use crate::types::VarType;

/// Kernel modules a unit depends on.
#[derive(Debug, Default, Clone)]
pub struct HeaderSet {
    modules: FxHashSet<RuntimeModule>,
}

impl HeaderSet {
    /// Record a dependency. Returns false if it was already recorded.
    pub fn add(&mut self, module: RuntimeModule) -> bool {
        self.modules.insert(module)
    }

    pub fn contains(&self, module: RuntimeModule) -> bool {
        self.modules.contains(&module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules in a stable order for output.
    pub fn sorted(&self) -> Vec<RuntimeModule> {
        let mut modules: Vec<_> = self.modules.iter().copied().collect();
        modules.sort_unstable();
        modules
    }
}

/// Mutable state of the unit being compiled.
pub struct CompilationContext<'r> {
    pub symbols: SymbolTable,
    headers: HeaderSet,
    buffer: InstructionBuffer,
    backend: Box<dyn HostBackend>,
    routine: RoutineContract,
    class: Option<ClassDefinition>,
    registry: &'r OptimizerRegistry,
    generic: &'r dyn GenericCallPath,
    options: CodegenOptions,
}

impl<'r> CompilationContext<'r> {
    /// Fresh context for `routine`.
    ///
    /// Declares the `return_value` slot, and the receiver slot unless the
    /// routine is static.
    pub fn new(
        routine: RoutineContract,
        registry: &'r OptimizerRegistry,
        generic: &'r dyn GenericCallPath,
        options: CodegenOptions,
    ) -> Self {
        let mut symbols = SymbolTable::new();
        let mut reserved = vec![RETURN_VALUE];
        if !routine.is_static {
            reserved.push(RECEIVER);
        }
        for name in reserved {
            if let Ok(slot) = symbols.declare_or_get(name, VarType::Variable, StorageClass::External) {
                slot.set_initialized(true);
            }
        }
        Self {
            symbols,
            headers: HeaderSet::default(),
            buffer: InstructionBuffer::new(),
            backend: options.backend.instantiate(),
            routine,
            class: None,
            registry,
            generic,
            options,
        }
    }

    pub fn with_class(mut self, class: ClassDefinition) -> Self {
        self.class = Some(class);
        self
    }

    pub fn routine(&self) -> &RoutineContract {
        &self.routine
    }

    pub fn class(&self) -> Option<&ClassDefinition> {
        self.class.as_ref()
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn backend(&self) -> &dyn HostBackend {
        self.backend.as_ref()
    }

    /// The process-wide optimizer table. Not tied to the borrow of `self`.
    pub fn registry(&self) -> &'r OptimizerRegistry {
        self.registry
    }

    /// The unspecialized call lowering. Not tied to the borrow of `self`.
    pub fn generic_calls(&self) -> &'r dyn GenericCallPath {
        self.generic
    }

    /// Create `name` on first use within the unit, otherwise return it.
    pub fn declare_or_get_variable(
        &mut self,
        name: &str,
        ty: VarType,
        storage: StorageClass,
    ) -> CodegenResult<&mut SymbolVariable> {
        self.symbols.declare_or_get(name, ty, storage)
    }

    /// Record that the unit depends on `module`. Idempotent.
    pub fn require_header(&mut self, module: RuntimeModule) {
        if self.headers.add(module) {
            tracing::trace!(%module, "require header");
        }
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Append one instruction to the unit's output.
    pub fn emit(&mut self, instruction: Instruction) {
        self.buffer.emit(instruction);
    }

    pub fn instructions(&self) -> &[Instruction] {
        self.buffer.as_slice()
    }

    /// Backend handle of the slot called `name`.
    pub fn variable_handle(&self, name: &str) -> CodegenResult<String> {
        let variable = self
            .symbols
            .get(name)
            .ok_or_else(|| CodegenError::undefined_variable(name))?;
        Ok(self.backend.variable_handle(variable))
    }

    /// Allocate the variant slot `name` before its first write.
    ///
    /// The first allocation emits `INIT_VARIANT`; later ones release the old
    /// value with `REINIT_VARIANT`. The reserved return and receiver slots are
    /// provided by the caller and never allocated here.
    pub fn init_variant(&mut self, name: &str) -> CodegenResult<()> {
        let variable = self
            .symbols
            .get_mut(name)
            .ok_or_else(|| CodegenError::undefined_variable(name))?;
        if variable.is_receiver() || variable.is_return_value() {
            return Ok(());
        }
        let handle = self.backend.variable_handle(variable);
        let reinit = variable.variant_inits() > 0;
        variable.record_variant_init();
        self.headers.add(RuntimeModule::Memory);
        self.buffer.emit(if reinit {
            Instruction::ReinitVariant(handle)
        } else {
            Instruction::InitVariant(handle)
        });
        Ok(())
    }

    /// Consume the context, yielding its instruction stream and headers.
    pub fn finish(self) -> (Vec<Instruction>, Vec<RuntimeModule>) {
        let headers = self.headers.sorted();
        (self.buffer.into_vec(), headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizers::tests::RecordingGenericPath;

    fn context<'r>(
        registry: &'r OptimizerRegistry,
        generic: &'r RecordingGenericPath,
        routine: RoutineContract,
    ) -> CompilationContext<'r> {
        CompilationContext::new(routine, registry, generic, CodegenOptions::default())
    }

    #[test]
    fn reserved_slots_are_declared() {
        let registry = OptimizerRegistry::empty();
        let generic = RecordingGenericPath::default();
        let ctx = context(&registry, &generic, RoutineContract::new("m"));
        assert!(ctx.symbols.get(RETURN_VALUE).unwrap().is_initialized());
        assert!(ctx.symbols.get(RECEIVER).unwrap().is_external());

        let ctx = context(
            &registry,
            &generic,
            RoutineContract::new("s").with_static(true),
        );
        assert!(!ctx.symbols.contains(RECEIVER));
    }

    #[test]
    fn require_header_is_idempotent() {
        let registry = OptimizerRegistry::empty();
        let generic = RecordingGenericPath::default();
        let mut ctx = context(&registry, &generic, RoutineContract::new("m"));
        ctx.require_header(RuntimeModule::File);
        ctx.require_header(RuntimeModule::File);
        assert_eq!(ctx.headers().len(), 1);
    }

    #[test]
    fn init_variant_then_reinit() {
        let registry = OptimizerRegistry::empty();
        let generic = RecordingGenericPath::default();
        let mut ctx = context(&registry, &generic, RoutineContract::new("m"));
        ctx.declare_or_get_variable("v", VarType::Variable, StorageClass::MemoryTracked)
            .unwrap();
        ctx.init_variant("v").unwrap();
        ctx.init_variant("v").unwrap();
        assert_eq!(
            ctx.instructions(),
            &[
                Instruction::InitVariant("&v".into()),
                Instruction::ReinitVariant("&v".into()),
            ]
        );
        assert!(ctx.headers().contains(RuntimeModule::Memory));
        assert!(ctx.symbols.get("v").unwrap().is_initialized());
    }

    #[test]
    fn init_variant_skips_reserved_slots() {
        let registry = OptimizerRegistry::empty();
        let generic = RecordingGenericPath::default();
        let mut ctx = context(&registry, &generic, RoutineContract::new("m"));
        ctx.init_variant(RETURN_VALUE).unwrap();
        ctx.init_variant(RECEIVER).unwrap();
        assert!(ctx.instructions().is_empty());
        assert!(ctx.headers().is_empty());
    }

    #[test]
    fn emission_order_is_invocation_order() {
        let registry = OptimizerRegistry::empty();
        let generic = RecordingGenericPath::default();
        let mut ctx = context(&registry, &generic, RoutineContract::new("m"));
        ctx.emit(Instruction::ReturnLong("1".into()));
        ctx.emit(Instruction::ReturnNone);
        let (instructions, headers) = ctx.finish();
        assert_eq!(
            instructions,
            vec![Instruction::ReturnLong("1".into()), Instruction::ReturnNone]
        );
        assert!(headers.is_empty());
    }
}
