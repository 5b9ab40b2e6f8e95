//! Single-execution memoization for async work.
//!
//! [`once`] wraps a work function in a guard ensuring exactly one execution
//! across all callers, however many invoke it concurrently. Callers arriving
//! while the execution is in flight block until it completes; every caller,
//! past or present, receives the identical cached outcome. Errors are as
//! sticky as values: a failed execution is never re-run.

use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::error::{TaskError, TaskResult};

/// Wrap `f` for single execution with result replay to all callers.
pub fn once<F, Fut, T>(f: F) -> OnceTask<F, T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = TaskResult<T>>,
{
    OnceTask {
        cell: OnceCell::new(),
        init: Mutex::new(Some(f)),
    }
}

/// A work function guarded for exactly-one execution.
///
/// State machine: not started → running → done. The cell provides the
/// mutual exclusion for the single execution and wakes every caller blocked
/// during the running phase with the same cached outcome.
pub struct OnceTask<F, T> {
    cell: OnceCell<TaskResult<T>>,
    init: Mutex<Option<F>>,
}

impl<F, Fut, T> OnceTask<F, T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = TaskResult<T>>,
    T: Clone,
{
    /// Execute the wrapped function if it has never run, otherwise replay
    /// the cached outcome. Concurrent callers during the first execution
    /// block until it resolves.
    pub async fn call(&self) -> TaskResult<T> {
        let outcome = self
            .cell
            .get_or_init(|| async {
                // The cell guarantees this init path runs at most once, so
                // the initializer is always still present here.
                let init = self.init.lock().take();
                match init {
                    Some(f) => f().await,
                    None => Err(TaskError::msg("initializer already consumed")),
                }
            })
            .await;
        outcome.clone()
    }

    /// True once the wrapped function has resolved.
    pub fn initialized(&self) -> bool {
        self.cell.initialized()
    }
}
