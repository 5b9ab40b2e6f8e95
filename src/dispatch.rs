//! Fire-and-forget task dispatch.
//!
//! These helpers launch side-effect-only work as untracked tokio tasks: no
//! handle, no observable completion, no error channel. A caller that needs
//! any of those wants [`Promise::run`](crate::Promise::run) instead.

use std::future::Future;

use tracing::debug;

use crate::context::Context;

/// Launch `fut` as a detached task.
///
/// Must be called from within a tokio runtime.
pub fn dispatch<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(fut);
}

/// Launch `fut` as a detached task unless `ctx` is already cancelled.
///
/// The check is a best-effort short-circuit at dispatch time only; once
/// spawned, the task is not cancelled by this wrapper and must observe `ctx`
/// itself to stop early.
pub fn dispatch_ctx<F>(ctx: &Context, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if ctx.is_cancelled() {
        debug!("dispatch skipped: context already cancelled");
        return;
    }
    tokio::spawn(fut);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn dispatch_runs_detached() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        dispatch(async move {
            flag.store(true, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dispatch_ctx_runs_on_live_context() {
        let ctx = Context::background();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        dispatch_ctx(&ctx, async move {
            flag.store(true, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dispatch_ctx_skips_cancelled_context() {
        let (ctx, cancel) = Context::background().with_cancel();
        cancel.cancel();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        dispatch_ctx(&ctx, async move {
            flag.store(true, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }
}
