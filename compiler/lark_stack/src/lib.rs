//! Stack growth guard for the lark evaluator.
//!
//! Evaluation of statements and expressions is a direct recursion over the
//! syntax tree, so deeply nested literals, long `a + b + c + ...` chains and
//! chains of host callbacks can exhaust the native stack. Wrapping each
//! recursive step in [`ensure_sufficient_stack`] grows the stack on demand.
//!
//! - **Native targets**: delegates to `stacker::maybe_grow`.
//! - **WASM targets**: calls the closure directly.

/// Minimum stack space to keep available before recursing (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Stack space allocated per growth step (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
///     ensure_sufficient_stack(|| self.eval_expr_inner(expr))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
