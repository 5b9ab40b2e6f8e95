//! Deadline enforcement for a single task.

use std::future::Future;
use std::time::Duration;

use crate::context::Context;
use crate::error::{join_outcome, TaskError, TaskResult};

/// Run `f` under a child token carrying a deadline of `duration` from now,
/// returning whichever comes first: the task's outcome, or
/// [`TaskError::DeadlineExceeded`] when the deadline elapses.
///
/// When the deadline fires first the task is **abandoned, not stopped**: it
/// keeps running until it observes the child token it was handed. This is
/// the same cooperative-leak trade-off [`race`](crate::race) makes.
///
/// # Errors
///
/// The task's own error, the deadline error, or the parent token's error if
/// the parent was cancelled first.
pub async fn with_timeout<T, F, Fut>(ctx: &Context, duration: Duration, f: F) -> TaskResult<T>
where
    F: FnOnce(Context) -> Fut,
    Fut: Future<Output = TaskResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let (child, cancel) = ctx.with_timeout(duration);
    let mut handle = tokio::spawn(f(child.clone()));
    let outcome = tokio::select! {
        joined = &mut handle => join_outcome(joined),
        () = child.cancelled() => Err(child.error().unwrap_or(TaskError::DeadlineExceeded)),
    };
    // Releases the deadline watcher promptly when the task finished first.
    cancel.cancel();
    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn fast_task_returns_its_value() {
        let ctx = Context::background();
        let value = with_timeout(&ctx, Duration::from_secs(5), |_child| async {
            Ok("prompt")
        })
        .await
        .unwrap();
        assert_eq!(value, "prompt");
    }

    #[tokio::test]
    async fn task_error_passes_through() {
        let ctx = Context::background();
        let err = with_timeout(&ctx, Duration::from_secs(5), |_child| async {
            Err::<u32, _>(TaskError::msg("backend down"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "backend down");
    }

    #[tokio::test]
    async fn deadline_wins_over_slow_task() {
        let ctx = Context::background();
        let started = Instant::now();
        let err = with_timeout(&ctx, Duration::from_millis(10), |_child| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(0)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, TaskError::DeadlineExceeded));
        assert!(started.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn overrunning_task_can_observe_the_child_token() {
        let ctx = Context::background();
        let observed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&observed);
        let err = with_timeout(&ctx, Duration::from_millis(10), move |child| async move {
            child.cancelled().await;
            flag.store(true, Ordering::SeqCst);
            Err::<u32, _>(TaskError::Cancelled)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, TaskError::DeadlineExceeded));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(observed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn parent_cancellation_cuts_the_deadline_short() {
        let (parent, cancel) = Context::background().with_cancel();
        let waiter = tokio::spawn(async move {
            with_timeout(&parent, Duration::from_secs(60), |child| async move {
                child.cancelled().await;
                Err::<u32, _>(TaskError::Cancelled)
            })
            .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, TaskError::Cancelled));
    }
}
