// src/symbols.rs
//
// Storage slots of the unit being compiled.
//
// Every slot has a storage class describing who owns the value it holds:
// - Temporary / MemoryTracked: owned by this scope, released or transferred once
// - LocalOnly: owned by this scope, never escapes it, not reference counted
// - External: borrowed from the caller, never released here

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::{CodegenError, CodegenResult};
use crate::types::VarType;

/// Slot holding the caller-provided return value.
pub const RETURN_VALUE: &str = "return_value";

/// Slot holding the method receiver.
pub const RECEIVER: &str = "this_ptr";

/// Ownership relationship between a slot and the current scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Temporary,
    LocalOnly,
    External,
    MemoryTracked,
}

/// How a dynamically typed slot must hand its value to the caller.
///
/// Derived from storage class and reference tracking; the return protocol
/// matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOwnership {
    /// Borrowed from a caller: copy, never transfer.
    Borrowed,
    /// Stack-local value: transfer without touching the refcount.
    LocalOnly,
    /// Owned but outside reference tracking: plain copy-construct.
    Untracked,
    /// Owned and tracked: refcount-preserving copy.
    Tracked,
}

/// One allocated storage slot.
#[derive(Debug, Clone)]
pub struct SymbolVariable {
    name: String,
    ty: VarType,
    dynamic_types: SmallVec<[VarType; 2]>,
    storage: StorageClass,
    memory_tracked: bool,
    initialized: bool,
    idle: bool,
    variant_inits: u32,
}

impl SymbolVariable {
    pub fn new(name: impl Into<String>, ty: VarType, storage: StorageClass) -> Self {
        let memory_tracked = match storage {
            StorageClass::Temporary | StorageClass::MemoryTracked => ty.is_host_value(),
            StorageClass::LocalOnly | StorageClass::External => false,
        };
        Self {
            name: name.into(),
            ty,
            dynamic_types: SmallVec::new(),
            storage,
            memory_tracked,
            initialized: false,
            idle: false,
            variant_inits: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared static type.
    pub fn ty(&self) -> VarType {
        self.ty
    }

    pub fn is_temporary(&self) -> bool {
        self.storage == StorageClass::Temporary
    }

    pub fn is_external(&self) -> bool {
        self.storage == StorageClass::External
    }

    pub fn is_local_only(&self) -> bool {
        self.storage == StorageClass::LocalOnly
    }

    pub fn is_memory_tracked(&self) -> bool {
        self.memory_tracked
    }

    pub fn set_memory_tracked(&mut self, tracked: bool) {
        self.memory_tracked = tracked;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    /// A consumed temporary whose slot may be handed out again.
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
    }

    pub fn is_receiver(&self) -> bool {
        self.name == RECEIVER
    }

    pub fn is_return_value(&self) -> bool {
        self.name == RETURN_VALUE
    }

    /// Runtime types observed flowing into this slot.
    pub fn dynamic_types(&self) -> &[VarType] {
        &self.dynamic_types
    }

    pub fn has_dynamic_type(&self, ty: VarType) -> bool {
        self.dynamic_types.contains(&ty)
    }

    /// Record that values of `ty` may be stored here at runtime.
    pub fn widen_dynamic_type(&mut self, ty: VarType) {
        if !self.dynamic_types.contains(&ty) {
            self.dynamic_types.push(ty);
        }
    }

    pub fn variant_inits(&self) -> u32 {
        self.variant_inits
    }

    pub(crate) fn record_variant_init(&mut self) {
        self.variant_inits += 1;
        self.initialized = true;
    }

    pub fn ownership(&self) -> ReturnOwnership {
        match self.storage {
            StorageClass::External => ReturnOwnership::Borrowed,
            StorageClass::LocalOnly => ReturnOwnership::LocalOnly,
            StorageClass::Temporary | StorageClass::MemoryTracked => {
                if self.memory_tracked {
                    ReturnOwnership::Tracked
                } else {
                    ReturnOwnership::Untracked
                }
            }
        }
    }
}

/// All slots of one unit, keyed by name.
#[derive(Debug, Default)]
pub struct SymbolTable {
    variables: FxHashMap<String, SymbolVariable>,
    /// Temporary names in allocation order, so reuse picks the oldest slot.
    temporaries: Vec<String>,
    temp_counter: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SymbolVariable> {
        self.variables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolVariable> {
        self.variables.get_mut(name)
    }

    /// Create `name` on first use, otherwise return the existing binding.
    ///
    /// Redeclaring a name with a different static type is a symbol error.
    pub fn declare_or_get(
        &mut self,
        name: &str,
        ty: VarType,
        storage: StorageClass,
    ) -> CodegenResult<&mut SymbolVariable> {
        if let Some(existing) = self.variables.get(name)
            && existing.ty != ty
        {
            return Err(CodegenError::symbol_collision(
                name,
                existing.ty.name(),
                ty.name(),
            ));
        }
        Ok(self
            .variables
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::trace!(name, ty = ty.name(), ?storage, "declare variable");
                SymbolVariable::new(name, ty, storage)
            }))
    }

    /// Look up a slot that is about to be read.
    pub fn variable_for_read(&self, name: &str) -> CodegenResult<&SymbolVariable> {
        let variable = self
            .variables
            .get(name)
            .ok_or_else(|| CodegenError::undefined_variable(name))?;
        if !variable.is_initialized() {
            return Err(CodegenError::uninitialized_variable(name));
        }
        Ok(variable)
    }

    /// A reference-tracked temporary to write a fresh value into.
    ///
    /// Idle temporaries of the same type are reused before a new slot is
    /// allocated.
    pub fn temp_variable_for_write(&mut self, ty: VarType) -> &mut SymbolVariable {
        self.temp_variable(ty, ty.is_host_value())
    }

    /// An untracked temporary used to observe a value owned elsewhere.
    pub fn temp_variable_for_observe(&mut self, ty: VarType) -> &mut SymbolVariable {
        self.temp_variable(ty, false)
    }

    fn temp_variable(&mut self, ty: VarType, tracked: bool) -> &mut SymbolVariable {
        let reusable = self.temporaries.iter().find(|name| {
            self.variables.get(name.as_str()).is_some_and(|var| {
                var.is_idle() && var.ty == ty && var.memory_tracked == tracked
            })
        });
        let name = match reusable {
            Some(name) => {
                tracing::trace!(name = name.as_str(), "reuse idle temporary");
                name.clone()
            }
            None => {
                let name = format!("_{}", self.temp_counter);
                self.temp_counter += 1;
                self.temporaries.push(name.clone());
                name
            }
        };
        let var = self.variables.entry(name).or_insert_with_key(|name| {
            let mut var = SymbolVariable::new(name.clone(), ty, StorageClass::Temporary);
            var.memory_tracked = tracked;
            var
        });
        var.idle = false;
        var
    }
}
