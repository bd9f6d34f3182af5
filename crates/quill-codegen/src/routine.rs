// src/routine.rs
//
// Read-only facts about the routine and class being compiled, produced by
// the signature processor and the class-definition resolver.

use quill_frontend::TypeHint;
use rustc_hash::FxHashSet;

/// The five result categories a return-type contract distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCategory {
    Null,
    Integer,
    Boolean,
    Double,
    String,
}

impl ReturnCategory {
    pub const ALL: [ReturnCategory; 5] = [
        ReturnCategory::Null,
        ReturnCategory::Integer,
        ReturnCategory::Boolean,
        ReturnCategory::Double,
        ReturnCategory::String,
    ];
}

/// Which categories the declared return types accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReturnTypeFlags {
    pub null: bool,
    pub int: bool,
    pub bool: bool,
    pub double: bool,
    pub string: bool,
}

impl ReturnTypeFlags {
    /// Every category accepted (a dynamically typed return).
    pub fn all() -> Self {
        Self {
            null: true,
            int: true,
            bool: true,
            double: true,
            string: true,
        }
    }

    pub fn accepts(&self, category: ReturnCategory) -> bool {
        match category {
            ReturnCategory::Null => self.null,
            ReturnCategory::Integer => self.int,
            ReturnCategory::Boolean => self.bool,
            ReturnCategory::Double => self.double,
            ReturnCategory::String => self.string,
        }
    }
}

/// Declared contract of the enclosing routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineContract {
    pub name: String,
    pub is_constructor: bool,
    pub is_void: bool,
    pub is_static: bool,
    /// `None` when the routine declares no return types.
    pub return_types: Option<ReturnTypeFlags>,
}

impl RoutineContract {
    /// An instance method without return-type declarations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_constructor: false,
            is_void: false,
            is_static: false,
            return_types: None,
        }
    }

    pub fn constructor(name: impl Into<String>) -> Self {
        Self {
            is_constructor: true,
            ..Self::new(name)
        }
    }

    /// Contract for a routine declared with `hints` as its return types.
    pub fn from_return_hints(name: impl Into<String>, hints: &[TypeHint]) -> Self {
        let mut contract = Self::new(name);
        if hints.is_empty() {
            return contract;
        }
        let mut flags = ReturnTypeFlags::default();
        for hint in hints {
            match hint {
                TypeHint::Int | TypeHint::Uint | TypeHint::Long | TypeHint::Char | TypeHint::Uchar => {
                    flags.int = true
                }
                TypeHint::Bool => flags.bool = true,
                TypeHint::Double => flags.double = true,
                TypeHint::String => flags.string = true,
                TypeHint::Null => flags.null = true,
                TypeHint::Var => flags = ReturnTypeFlags::all(),
                TypeHint::Array => {}
                TypeHint::Void => contract.is_void = true,
            }
        }
        if !contract.is_void {
            contract.return_types = Some(flags);
        }
        contract
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn void(mut self) -> Self {
        self.is_void = true;
        self
    }

    pub fn has_return_types(&self) -> bool {
        self.return_types.is_some()
    }
}

/// The class whose method is being compiled.
#[derive(Debug, Clone, Default)]
pub struct ClassDefinition {
    name: String,
    properties: FxHashSet<String>,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: FxHashSet::default(),
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.insert(property.into());
        self
    }

    /// Fully qualified class name.
    pub fn complete_name(&self) -> &str {
        &self.name
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.contains(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_hints_means_no_constraints() {
        let contract = RoutineContract::from_return_hints("run", &[]);
        assert!(!contract.has_return_types());
        assert!(!contract.is_void);
    }

    #[test]
    fn integer_family_hints_set_int_flag() {
        for hint in [TypeHint::Int, TypeHint::Uint, TypeHint::Long, TypeHint::Char] {
            let flags = RoutineContract::from_return_hints("f", &[hint])
                .return_types
                .unwrap();
            assert!(flags.int);
            assert!(!flags.string);
        }
    }

    #[test]
    fn nullable_string_accepts_null_and_string() {
        let flags = RoutineContract::from_return_hints("f", &[TypeHint::String, TypeHint::Null])
            .return_types
            .unwrap();
        assert!(flags.accepts(ReturnCategory::String));
        assert!(flags.accepts(ReturnCategory::Null));
        assert!(!flags.accepts(ReturnCategory::Integer));
    }

    #[test]
    fn var_hint_accepts_everything() {
        let flags = RoutineContract::from_return_hints("f", &[TypeHint::Var])
            .return_types
            .unwrap();
        for category in ReturnCategory::ALL {
            assert!(flags.accepts(category));
        }
    }

    #[test]
    fn void_hint_marks_routine_void() {
        let contract = RoutineContract::from_return_hints("f", &[TypeHint::Void]);
        assert!(contract.is_void);
        assert!(!contract.has_return_types());
    }

    #[test]
    fn class_knows_its_properties() {
        let class = ClassDefinition::new("App\\User").with_property("name");
        assert!(class.has_property("name"));
        assert!(!class.has_property("email"));
        assert_eq!(class.complete_name(), "App\\User");
    }
}
