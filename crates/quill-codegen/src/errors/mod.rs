// src/errors/mod.rs
//! Code emission errors.
//!
//! Every error is fatal to the unit being compiled. Nothing below the unit
//! driver catches them; the driver drops the unit's partial instruction
//! buffer and hands the error to the diagnostic reporter.
//!
//! Error code ranges:
//! - E31xx: symbol table errors
//! - E32xx: compiler (structural and type-contract) errors

use miette::{Diagnostic, LabeledSpan};
use quill_identity::Span;
use std::fmt;
use thiserror::Error;

/// The two error families a unit can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Name or type collision while declaring a variable.
    Symbol,
    /// Structural or type-contract violation.
    Compiler,
}

/// Why a value-returning `return` is not allowed in the enclosing routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnContext {
    Constructor,
    Void,
}

/// The kind of code emission error.
#[derive(Debug, Clone, PartialEq)]
pub enum CodegenErrorKind {
    /// A variable was redeclared with a different static type
    SymbolCollision {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },

    /// Call result assigned to a variable that can never hold it
    IncompatibleTarget {
        function: String,
        target: String,
        target_type: &'static str,
    },

    /// `this.<prop>` names a property the class does not declare
    MissingProperty { class: String, property: String },

    /// Value returned from a constructor or a void routine
    ReturnNotAllowed(ReturnContext),

    /// Returned value's category is excluded by the routine's return types
    IncompatibleReturn { found: &'static str },

    /// Value kind or variable type that has no return strategy
    CannotReturn { kind: &'static str, variable: bool },

    /// Value assigned to a typed variable that cannot hold it
    IncompatibleAssignment {
        name: String,
        target_type: &'static str,
        found: &'static str,
    },

    /// Variable read before declaration
    UndefinedVariable { name: String },

    /// Variable read before any write
    UninitializedVariable { name: String },

    /// Construct the emitter has no lowering for
    UnsupportedFeature {
        feature: &'static str,
        context: Option<String>,
    },

    /// Internal invariant violation (compiler bug)
    InternalError {
        message: &'static str,
        context: Option<String>,
    },
}

impl CodegenErrorKind {
    pub fn class(&self) -> ErrorClass {
        match self {
            CodegenErrorKind::SymbolCollision { .. } => ErrorClass::Symbol,
            CodegenErrorKind::IncompatibleTarget { .. }
            | CodegenErrorKind::MissingProperty { .. }
            | CodegenErrorKind::ReturnNotAllowed(_)
            | CodegenErrorKind::IncompatibleReturn { .. }
            | CodegenErrorKind::CannotReturn { .. }
            | CodegenErrorKind::IncompatibleAssignment { .. }
            | CodegenErrorKind::UndefinedVariable { .. }
            | CodegenErrorKind::UninitializedVariable { .. }
            | CodegenErrorKind::UnsupportedFeature { .. }
            | CodegenErrorKind::InternalError { .. } => ErrorClass::Compiler,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            CodegenErrorKind::SymbolCollision { .. } => "E3101",
            CodegenErrorKind::IncompatibleTarget { .. } => "E3202",
            CodegenErrorKind::MissingProperty { .. } => "E3203",
            CodegenErrorKind::ReturnNotAllowed(_) => "E3204",
            CodegenErrorKind::IncompatibleReturn { .. } => "E3205",
            CodegenErrorKind::CannotReturn { .. } => "E3206",
            CodegenErrorKind::IncompatibleAssignment { .. } => "E3207",
            CodegenErrorKind::UndefinedVariable { .. } => "E3208",
            CodegenErrorKind::UninitializedVariable { .. } => "E3209",
            CodegenErrorKind::UnsupportedFeature { .. } => "E3210",
            CodegenErrorKind::InternalError { .. } => "E3299",
        }
    }

    fn label(&self) -> String {
        match self {
            CodegenErrorKind::SymbolCollision { existing, .. } => {
                format!("already declared as {}", existing)
            }
            CodegenErrorKind::IncompatibleTarget { target_type, .. } => {
                format!("assigned to a {} variable", target_type)
            }
            CodegenErrorKind::MissingProperty { .. } => "undeclared property".to_string(),
            CodegenErrorKind::ReturnNotAllowed(ReturnContext::Constructor) => {
                "returned from a constructor".to_string()
            }
            CodegenErrorKind::ReturnNotAllowed(ReturnContext::Void) => {
                "returned from a void method".to_string()
            }
            CodegenErrorKind::IncompatibleReturn { found } => format!("returns {}", found),
            CodegenErrorKind::CannotReturn { kind, .. } => format!("{} cannot be returned", kind),
            CodegenErrorKind::IncompatibleAssignment { found, .. } => {
                format!("value of type {}", found)
            }
            CodegenErrorKind::UndefinedVariable { .. } => "not declared".to_string(),
            CodegenErrorKind::UninitializedVariable { .. } => "read before write".to_string(),
            CodegenErrorKind::UnsupportedFeature { feature, .. } => {
                format!("{} is not supported", feature)
            }
            CodegenErrorKind::InternalError { message, .. } => message.to_string(),
        }
    }
}

/// Code emission error with optional source span for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct CodegenError {
    /// The kind of error.
    pub kind: CodegenErrorKind,
    /// Source location of the offending node, if available.
    pub span: Option<Span>,
}

impl CodegenError {
    pub fn symbol_collision(
        name: impl Into<String>,
        existing: &'static str,
        requested: &'static str,
    ) -> Self {
        CodegenErrorKind::SymbolCollision {
            name: name.into(),
            existing,
            requested,
        }
        .into()
    }

    pub fn incompatible_target(
        function: impl Into<String>,
        target: impl Into<String>,
        target_type: &'static str,
    ) -> Self {
        CodegenErrorKind::IncompatibleTarget {
            function: function.into(),
            target: target.into(),
            target_type,
        }
        .into()
    }

    pub fn missing_property(class: impl Into<String>, property: impl Into<String>) -> Self {
        CodegenErrorKind::MissingProperty {
            class: class.into(),
            property: property.into(),
        }
        .into()
    }

    pub fn return_not_allowed(context: ReturnContext) -> Self {
        CodegenErrorKind::ReturnNotAllowed(context).into()
    }

    pub fn incompatible_return(found: &'static str) -> Self {
        CodegenErrorKind::IncompatibleReturn { found }.into()
    }

    /// A compiled value kind with no return strategy.
    pub fn cannot_return(kind: &'static str) -> Self {
        CodegenErrorKind::CannotReturn {
            kind,
            variable: false,
        }
        .into()
    }

    /// A variable whose static type has no return strategy.
    pub fn cannot_return_variable(ty: &'static str) -> Self {
        CodegenErrorKind::CannotReturn {
            kind: ty,
            variable: true,
        }
        .into()
    }

    pub fn incompatible_assignment(
        name: impl Into<String>,
        target_type: &'static str,
        found: &'static str,
    ) -> Self {
        CodegenErrorKind::IncompatibleAssignment {
            name: name.into(),
            target_type,
            found,
        }
        .into()
    }

    pub fn undefined_variable(name: impl Into<String>) -> Self {
        CodegenErrorKind::UndefinedVariable { name: name.into() }.into()
    }

    pub fn uninitialized_variable(name: impl Into<String>) -> Self {
        CodegenErrorKind::UninitializedVariable { name: name.into() }.into()
    }

    /// Create an unsupported feature error
    pub fn unsupported(feature: &'static str) -> Self {
        CodegenErrorKind::UnsupportedFeature {
            feature,
            context: None,
        }
        .into()
    }

    /// Create an unsupported feature error with context
    pub fn unsupported_with_context(feature: &'static str, context: impl Into<String>) -> Self {
        CodegenErrorKind::UnsupportedFeature {
            feature,
            context: Some(context.into()),
        }
        .into()
    }

    /// Create an internal error with context
    pub fn internal_with_context(message: &'static str, context: impl Into<String>) -> Self {
        CodegenErrorKind::InternalError {
            message,
            context: Some(context.into()),
        }
        .into()
    }

    /// Attach a source span to this error for diagnostics.
    ///
    /// Keeps the innermost span when one is already attached.
    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    pub fn is_symbol_error(&self) -> bool {
        self.class() == ErrorClass::Symbol
    }

    pub fn is_compiler_error(&self) -> bool {
        self.class() == ErrorClass::Compiler
    }
}

impl From<CodegenErrorKind> for CodegenError {
    fn from(kind: CodegenErrorKind) -> Self {
        CodegenError { kind, span: None }
    }
}

impl Diagnostic for CodegenError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let labeled = LabeledSpan::new_with_span(Some(self.kind.label()), span);
        Some(Box::new(std::iter::once(labeled)))
    }
}

impl fmt::Display for CodegenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenErrorKind::SymbolCollision {
                name,
                existing,
                requested,
            } => write!(
                f,
                "variable '{}' is already declared as {}, cannot redeclare it as {}",
                name, existing, requested
            ),
            CodegenErrorKind::IncompatibleTarget {
                function,
                target,
                target_type,
            } => write!(
                f,
                "values returned by {} can only be assigned to variant variables, '{}' is {}",
                function, target, target_type
            ),
            CodegenErrorKind::MissingProperty { class, property } => write!(
                f,
                "class '{}' does not have a property called: '{}'",
                class, property
            ),
            CodegenErrorKind::ReturnNotAllowed(ReturnContext::Constructor) => {
                write!(f, "constructors cannot return values")
            }
            CodegenErrorKind::ReturnNotAllowed(ReturnContext::Void) => {
                write!(
                    f,
                    "method is marked as 'void' and it must not return any value"
                )
            }
            CodegenErrorKind::IncompatibleReturn { found } => write!(
                f,
                "returning type: {} but this type is not compatible with return-type hints declared in the method",
                found
            ),
            CodegenErrorKind::CannotReturn {
                kind,
                variable: true,
            } => write!(f, "cannot return variable '{}'", kind),
            CodegenErrorKind::CannotReturn {
                kind,
                variable: false,
            } => write!(f, "cannot return '{}'", kind),
            CodegenErrorKind::IncompatibleAssignment {
                name,
                target_type,
                found,
            } => write!(
                f,
                "cannot assign {} to variable '{}' of type {}",
                found, name, target_type
            ),
            CodegenErrorKind::UndefinedVariable { name } => {
                write!(f, "cannot read variable '{}' because it wasn't declared", name)
            }
            CodegenErrorKind::UninitializedVariable { name } => write!(
                f,
                "variable '{}' cannot be read because it's not initialized",
                name
            ),
            CodegenErrorKind::UnsupportedFeature { feature, context } => {
                write!(f, "unsupported feature: {}", feature)?;
                if let Some(ctx) = context {
                    write!(f, " ({})", ctx)?;
                }
                Ok(())
            }
            CodegenErrorKind::InternalError { message, context } => {
                write!(f, "internal error: {}", message)?;
                if let Some(ctx) = context {
                    write!(f, " ({})", ctx)?;
                }
                Ok(())
            }
        }
    }
}

/// Result type alias for code emission operations.
pub type CodegenResult<T> = Result<T, CodegenError>;
