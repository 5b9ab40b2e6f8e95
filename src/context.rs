//! Cooperative cancellation and deadline tokens.
//!
//! A [`Context`] is an explicit value threaded through work functions. It
//! answers two queries — is the token done, and why — and can derive child
//! tokens carrying an explicit cancel handle or a deadline. Cancelling a
//! parent cancels every descendant.
//!
//! Cancellation is purely cooperative: a fired token unblocks the waits
//! inside the primitives (`race`, `with_timeout`, `pool`, backoff sleeps)
//! but never forcibly stops a running task. Work functions that want to stop
//! promptly must poll [`Context::check`] or await [`Context::cancelled`].
//!
//! Deriving a child with a deadline requires a running tokio runtime, since
//! the deadline is enforced by a lightweight watcher task.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{TaskError, TaskResult};

/// A cancellation/deadline token shared by a tree of tasks.
///
/// Cloning is cheap and every clone observes the same cancellation state.
/// The root token is obtained from [`Context::background`]; children are
/// derived with [`Context::with_cancel`], [`Context::with_timeout`], or
/// [`Context::with_deadline`].
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    cause: Arc<OnceLock<TaskError>>,
    deadline: Option<Instant>,
    parent: Option<Arc<Context>>,
}

impl Context {
    /// Root token: never cancelled unless a caller cancels a derived child.
    #[must_use]
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            cause: Arc::new(OnceLock::new()),
            deadline: None,
            parent: None,
        }
    }

    /// Derive a child that can be cancelled independently of its parent.
    #[must_use]
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let child = Self {
            token: self.token.child_token(),
            cause: Arc::new(OnceLock::new()),
            deadline: self.deadline,
            parent: Some(Arc::new(self.clone())),
        };
        let handle = CancelHandle {
            token: child.token.clone(),
            cause: Arc::clone(&child.cause),
        };
        (child, handle)
    }

    /// Derive a child cancelled automatically `duration` from now.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn with_timeout(&self, duration: Duration) -> (Self, CancelHandle) {
        self.with_deadline(Instant::now() + duration)
    }

    /// Derive a child cancelled automatically at `deadline`.
    ///
    /// The effective deadline never extends past the parent's. Must be
    /// called from within a tokio runtime.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> (Self, CancelHandle) {
        let deadline = match self.deadline {
            Some(parent_deadline) => parent_deadline.min(deadline),
            None => deadline,
        };
        let (mut child, handle) = self.with_cancel();
        child.deadline = Some(deadline);

        let watch_token = child.token.clone();
        let watch_cause = Arc::clone(&child.cause);
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep_until(deadline) => {
                    let _ = watch_cause.set(TaskError::DeadlineExceeded);
                    watch_token.cancel();
                }
                () = watch_token.cancelled() => {}
            }
        });

        (child, handle)
    }

    /// True once this token or any ancestor has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The cancellation error, or `None` while the token is live.
    ///
    /// When cancellation propagated from an ancestor, the ancestor's cause
    /// (for example [`TaskError::DeadlineExceeded`]) is reported.
    #[must_use]
    pub fn error(&self) -> Option<TaskError> {
        if !self.token.is_cancelled() {
            return None;
        }
        let mut node = Some(self);
        while let Some(ctx) = node {
            if let Some(cause) = ctx.cause.get() {
                return Some(cause.clone());
            }
            node = ctx.parent.as_deref();
        }
        Some(TaskError::Cancelled)
    }

    /// `Err` with the cancellation error once the token is done, `Ok(())`
    /// otherwise. Convenient for work functions polling at safe points.
    pub fn check(&self) -> TaskResult<()> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Wait until this token is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The deadline this token carries, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

/// Handle to cancel a derived [`Context`].
///
/// Dropping the handle does not cancel the token.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
    cause: Arc<OnceLock<TaskError>>,
}

impl CancelHandle {
    /// Cancel the associated token. Idempotent; the first cancellation
    /// (explicit or deadline) fixes the reported cause.
    pub fn cancel(&self) {
        let _ = self.cause.set(TaskError::Cancelled);
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_is_live() {
        let ctx = Context::background();
        assert!(!ctx.is_cancelled());
        assert!(ctx.error().is_none());
        assert!(ctx.check().is_ok());
    }

    #[tokio::test]
    async fn cancel_reports_cancelled() {
        let (ctx, cancel) = Context::background().with_cancel();
        cancel.cancel();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.error(), Some(TaskError::Cancelled)));
        assert!(ctx.check().is_err());
    }

    #[tokio::test]
    async fn deadline_reports_deadline_exceeded() {
        let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(10));
        ctx.cancelled().await;
        assert!(matches!(ctx.error(), Some(TaskError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn parent_cancellation_propagates_cause() {
        let (parent, _cancel) = Context::background().with_timeout(Duration::from_millis(10));
        let (child, _child_cancel) = parent.with_cancel();
        child.cancelled().await;
        assert!(matches!(child.error(), Some(TaskError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn explicit_cancel_beats_deadline() {
        let (ctx, cancel) = Context::background().with_timeout(Duration::from_secs(60));
        cancel.cancel();
        assert!(matches!(ctx.error(), Some(TaskError::Cancelled)));
    }

    #[tokio::test]
    async fn child_deadline_never_extends_parent() {
        let near = Instant::now() + Duration::from_millis(10);
        let (parent, _c1) = Context::background().with_deadline(near);
        let (child, _c2) = parent.with_deadline(Instant::now() + Duration::from_secs(120));
        assert_eq!(child.deadline(), Some(near));
    }
}
