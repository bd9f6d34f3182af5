// src/optimizers/mod.rs
//
// Function-call optimizers: built-in calls with a direct kernel routine are
// lowered to a specialized call instead of a dynamic host-level call.
//
// Candidates for a name are tried in registration order; the first one that
// specializes wins. A candidate that declines must not have touched the
// context. When nothing specializes, the generic call path runs once.

mod case_fold;
mod file_get_contents;
mod file_put_contents;
mod microtime;

use std::sync::LazyLock;

use quill_frontend::Expr;
use rustc_hash::FxHashMap;

use crate::calls::Call;
use crate::context::CompilationContext;
use crate::errors::CodegenResult;
use crate::types::CompiledExpression;

pub use case_fold::CaseFoldOptimizer;
pub use file_get_contents::FileGetContentsOptimizer;
pub use file_put_contents::FilePutContentsOptimizer;
pub use microtime::MicrotimeOptimizer;

/// Result of offering a call to one optimizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Optimized {
    /// The call was lowered; this is its value.
    Specialized(CompiledExpression),
    /// Preconditions not met. Nothing was emitted.
    NotApplicable,
}

/// A specialization for calls to one built-in function.
pub trait FunctionOptimizer: Send + Sync {
    /// Name used in traces.
    fn name(&self) -> &'static str;

    /// Lower `call`, or decline with `Optimized::NotApplicable`.
    ///
    /// Preconditions are checked before anything is emitted or declared.
    fn attempt(
        &self,
        expr: &Expr,
        call: &mut Call<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<Optimized>;
}

/// Unspecialized lowering of a function call through the host's dynamic
/// dispatch.
pub trait GenericCallPath {
    fn compile_call(
        &self,
        expr: &Expr,
        call: &mut Call<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression>;
}

/// Optimizers keyed by the function name they specialize.
///
/// Populated once, then read-only; a single registry may be shared by units
/// compiling on different threads.
#[derive(Default)]
pub struct OptimizerRegistry {
    candidates: FxHashMap<String, Vec<Box<dyn FunctionOptimizer>>>,
}

static BUILTIN: LazyLock<OptimizerRegistry> = LazyLock::new(OptimizerRegistry::with_builtins);

impl OptimizerRegistry {
    /// A registry with no optimizers: every call takes the generic path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding every built-in optimizer.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("file_get_contents", Box::new(FileGetContentsOptimizer));
        registry.register("file_put_contents", Box::new(FilePutContentsOptimizer));
        registry.register("microtime", Box::new(MicrotimeOptimizer));
        registry.register("strtolower", Box::new(CaseFoldOptimizer::lower()));
        registry.register("strtoupper", Box::new(CaseFoldOptimizer::upper()));
        registry
    }

    /// Process-wide registry of built-in optimizers, built on first use.
    pub fn builtin() -> &'static OptimizerRegistry {
        &BUILTIN
    }

    /// Add `optimizer` after any already registered for `function`.
    pub fn register(&mut self, function: impl Into<String>, optimizer: Box<dyn FunctionOptimizer>) {
        self.candidates
            .entry(function.into())
            .or_default()
            .push(optimizer);
    }

    /// Candidates for `function` in registration order.
    pub fn lookup(&self, function: &str) -> &[Box<dyn FunctionOptimizer>] {
        self.candidates
            .get(function)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, function: &str) -> bool {
        self.candidates.contains_key(function)
    }

    /// Number of function names with at least one optimizer.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Compile `call`, specialized if any candidate accepts it.
    #[tracing::instrument(skip_all, fields(function = call.name()))]
    pub fn dispatch(
        &self,
        expr: &Expr,
        call: &mut Call<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression> {
        if ctx.options().optimizer_enabled(call.name()) {
            for candidate in self.lookup(call.name()) {
                match candidate.attempt(expr, call, ctx)? {
                    Optimized::Specialized(compiled) => {
                        tracing::debug!(optimizer = candidate.name(), "specialized call");
                        return Ok(compiled);
                    }
                    Optimized::NotApplicable => {
                        tracing::trace!(optimizer = candidate.name(), "optimizer declined");
                    }
                }
            }
        } else {
            tracing::debug!("optimizers disabled for call");
        }
        tracing::debug!("generic call path");
        ctx.generic_calls().compile_call(expr, call, ctx)
    }
}

impl std::fmt::Debug for OptimizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.candidates.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("OptimizerRegistry")
            .field("functions", &names)
            .finish()
    }
}
