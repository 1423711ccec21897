//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag a host flips to stop an evaluation.
///
/// The evaluator polls it at every loop iteration and every call; once set,
/// evaluation unwinds with [`EvalAbort::Cancelled`](crate::EvalAbort).
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        if !self.0.swap(true, Ordering::AcqRel) {
            tracing::debug!("evaluation cancelled");
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
