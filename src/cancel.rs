//! Cooperative cancellation.
//!
//! The evaluator is single-threaded (spec §5: no internal parallelism),
//! but a caller running it from a worker thread or an async task still
//! needs a way to ask it to stop between rounds. A [`CancelToken`] is
//! checked at stratum and round boundaries in the bottom-up driver; it is
//! never checked mid-round, so cancellation latency is bounded by one
//! round's work, not instantaneous.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{EvalError, EvalResult};

/// Shared cancellation flag. Clone to hand copies to the evaluator and to
/// whatever triggers cancellation; all clones observe the same flag.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(EvalError::Canceled)` iff cancellation was requested.
    /// Call at round/stratum boundaries in the evaluator's main loop.
    pub fn check(&self) -> EvalResult<()> {
        if self.is_canceled() {
            Err(EvalError::Canceled)
        } else {
            Ok(())
        }
    }
}
