//! Eager single async results.
//!
//! [`Promise::run`] starts its work function immediately on the tokio
//! runtime; [`Promise::wait`] resolves to the outcome. The wrapped task
//! executes exactly once however many callers wait, the first waiter blocks
//! on the completion channel, and every later wait reads the cached outcome
//! without re-blocking. Both value and error are cached and replayed
//! identically ("sticky" outcomes).
//!
//! A started promise cannot be aborted; there is deliberately no
//! cancellation surface here. Use [`with_timeout`](crate::with_timeout) when
//! a bound is required.

use std::future::Future;

use tokio::sync::{oneshot, Mutex};

use crate::error::{TaskError, TaskResult};

/// Resolution state: a single-slot completion channel until the first
/// waiter drains it, then the immutable cached outcome.
enum PromiseState<T> {
    Pending(oneshot::Receiver<TaskResult<T>>),
    Resolved(TaskResult<T>),
}

/// Handle to a value computed by a task that has already started.
///
/// # Examples
///
/// ```rust,ignore
/// let promise = Promise::run(|| async { fetch_profile(42).await });
/// // ... other work ...
/// let profile = promise.wait().await?;
/// ```
pub struct Promise<T> {
    state: Mutex<PromiseState<T>>,
}

impl<T> Promise<T>
where
    T: Send + 'static,
{
    /// Spawn `f` immediately and return a handle to its eventual outcome.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            // Nobody waiting is fine; the send result is irrelevant.
            let _ = tx.send(f().await);
        });
        Self {
            state: Mutex::new(PromiseState::Pending(rx)),
        }
    }
}

impl<T> Promise<T>
where
    T: Clone,
{
    /// Block (asynchronously) until the task resolves, then return its
    /// outcome. Safe to call repeatedly and from concurrent callers; all of
    /// them observe the identical outcome.
    pub async fn wait(&self) -> TaskResult<T> {
        let mut state = self.state.lock().await;
        match &mut *state {
            PromiseState::Resolved(outcome) => outcome.clone(),
            PromiseState::Pending(rx) => {
                // A dropped sender means the task died without reporting.
                let outcome = match rx.await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(TaskError::Panicked(
                        "task finished without producing a result".into(),
                    )),
                };
                *state = PromiseState::Resolved(outcome.clone());
                outcome
            }
        }
    }
}
