//! Fan-out/fan-in combinators over sets of work functions.
//!
//! Each combinator spawns one tokio task per work function, then joins
//! according to its wait policy:
//!
//! - [`all`] and [`all_settled`] always join every task, even after a
//!   failure is known, so no task is ever left running unobserved.
//! - [`race`] returns as soon as the first task reports and only signals the
//!   losers through a shared child token — the one primitive here that
//!   trades a bounded leak risk for minimum latency.
//!
//! Result order always matches input order, never completion order. When
//! several tasks fail, [`all`] deterministically reports the first failure
//! in input-index order, so identical inputs report identical errors
//! regardless of scheduling jitter.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;

use crate::context::Context;
use crate::error::{join_outcome, TaskError, TaskResult};

/// A boxed work function: receives a [`Context`] and produces an outcome.
///
/// Boxing lets callers pass a mixed bag of closures in one `Vec`; wrap each
/// with [`task_fn`].
pub type TaskFn<T> = Box<dyn FnOnce(Context) -> BoxFuture<'static, TaskResult<T>> + Send>;

/// Box an async closure into a [`TaskFn`].
pub fn task_fn<F, Fut, T>(f: F) -> TaskFn<T>
where
    F: FnOnce(Context) -> Fut + Send + 'static,
    Fut: Future<Output = TaskResult<T>> + Send + 'static,
{
    Box::new(move |ctx| f(ctx).boxed())
}

/// Run all work functions concurrently; fail on the first error in input
/// order, otherwise return the values in input order.
///
/// Every spawned task is joined before this returns, even when an early
/// task has already failed: a reported error never implies a leaked task.
/// The token is forwarded to the work functions but not cancelled by this
/// combinator.
pub async fn all<T>(ctx: &Context, fns: Vec<TaskFn<T>>) -> TaskResult<Vec<T>>
where
    T: Send + 'static,
{
    all_settled(ctx, fns).await.into_iter().collect()
}

/// Run all work functions concurrently and return every outcome, one per
/// input, in input order.
///
/// Never short-circuits and never aggregates: each task's success or
/// failure is inspectable independently via [`Result::is_ok`].
pub async fn all_settled<T>(ctx: &Context, fns: Vec<TaskFn<T>>) -> Vec<TaskResult<T>>
where
    T: Send + 'static,
{
    let handles: Vec<_> = fns
        .into_iter()
        .map(|f| tokio::spawn(f(ctx.clone())))
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(join_outcome(handle.await));
    }
    outcomes
}

/// Run all work functions concurrently and return the outcome of whichever
/// reports first, success or failure.
///
/// All tasks share one derived child token, cancelled when the winner
/// reports. Losers are signalled but **not awaited**: a loser that ignores
/// the token keeps running after `race` returns. That leak risk is accepted
/// in exchange for lowest latency; work functions that must stop promptly
/// should poll [`Context::check`] or await [`Context::cancelled`].
///
/// # Errors
///
/// An empty input is an error rather than a wait that can never finish.
pub async fn race<T>(ctx: &Context, fns: Vec<TaskFn<T>>) -> TaskResult<T>
where
    T: Send + 'static,
{
    if fns.is_empty() {
        return Err(TaskError::msg("race requires at least one work function"));
    }

    let (child, cancel) = ctx.with_cancel();
    let (tx, mut rx) = mpsc::channel(fns.len());
    for f in fns {
        let tx = tx.clone();
        let child = child.clone();
        tokio::spawn(async move {
            // Capacity covers every task, so the buffer never rejects.
            let _ = tx.try_send(f(child).await);
        });
    }
    drop(tx);

    let outcome = match rx.recv().await {
        Some(outcome) => outcome,
        None => Err(TaskError::Panicked(
            "every raced task died before reporting".into(),
        )),
    };
    cancel.cancel();
    outcome
}
