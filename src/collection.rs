//! Concurrent application of one work function over a sequence.
//!
//! [`map`] and [`for_each`] spawn one task per item (unbounded fan-out) and
//! follow the [`all`](crate::all) ordering and aggregation contract. [`pool`]
//! bounds the fan-out: a fixed set of workers drains a shared queue of
//! indexed items, so at most `workers` items are in flight at once while the
//! output still lands in input order.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::error::{join_outcome, TaskError, TaskResult};

/// Apply `f` to every item concurrently, one task per item, and collect the
/// results in input order.
///
/// Identical aggregation contract to [`all`](crate::all): every task is
/// joined before returning, and the first error in input-index order wins.
pub async fn map<T, R, F, Fut>(ctx: &Context, items: Vec<T>, f: F) -> TaskResult<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TaskResult<R>> + Send + 'static,
{
    let f = Arc::new(f);
    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let f = Arc::clone(&f);
            let ctx = ctx.clone();
            tokio::spawn(async move { f(ctx, item).await })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(join_outcome(handle.await));
    }
    outcomes.into_iter().collect()
}

/// Apply `f` to every item concurrently for its side effects only.
pub async fn for_each<T, F, Fut>(ctx: &Context, items: Vec<T>, f: F) -> TaskResult<()>
where
    T: Send + 'static,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TaskResult<()>> + Send + 'static,
{
    map(ctx, items, f).await.map(|_| ())
}

/// Apply `f` to every item with bounded concurrency.
///
/// `workers` tasks (coerced to at least one) drain a shared queue of
/// `(index, item)` pairs. Each worker checks the token before taking on an
/// item: once the token fires, the token's error is recorded for that item
/// and the worker stops taking new work. An item already in flight is never
/// aborted mid-item — finer-grained cancellation is the work function's
/// responsibility via the token it receives.
///
/// Results are placed by original index after all workers finish, and the
/// first error in input-index order is returned.
pub async fn pool<T, R, F, Fut>(
    ctx: &Context,
    workers: usize,
    items: Vec<T>,
    f: F,
) -> TaskResult<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TaskResult<R>> + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    let workers = workers.max(1);
    debug!(workers, items = total, "draining bounded pool");

    // Pre-filled shared queue; workers take with a non-blocking recv since
    // nothing is ever added after this point.
    let (queue_tx, queue_rx) = crossbeam_channel::unbounded::<(usize, T)>();
    for indexed in items.into_iter().enumerate() {
        let _ = queue_tx.send(indexed);
    }
    drop(queue_tx);

    let f = Arc::new(f);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let queue = queue_rx.clone();
        let f = Arc::clone(&f);
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            let mut recorded: Vec<(usize, TaskResult<R>)> = Vec::new();
            while let Ok((index, item)) = queue.try_recv() {
                if let Some(err) = ctx.error() {
                    recorded.push((index, Err(err)));
                    break;
                }
                recorded.push((index, f(ctx.clone(), item).await));
            }
            recorded
        }));
    }

    let mut slots: Vec<Option<TaskResult<R>>> = std::iter::repeat_with(|| None)
        .take(total)
        .collect();
    let mut worker_failure = None;
    for handle in handles {
        match handle.await {
            Ok(recorded) => {
                for (index, outcome) in recorded {
                    slots[index] = Some(outcome);
                }
            }
            Err(err) => worker_failure = Some(TaskError::Panicked(err.to_string())),
        }
    }

    let mut values = Vec::with_capacity(total);
    for slot in slots {
        match slot {
            Some(Ok(value)) => values.push(value),
            Some(Err(err)) => return Err(err),
            // Item never taken: workers stopped on cancellation or died.
            None => {
                return Err(ctx.error().or_else(|| worker_failure.clone()).unwrap_or_else(|| {
                    TaskError::Panicked("pool worker died before draining the queue".into())
                }))
            }
        }
    }
    Ok(values)
}
