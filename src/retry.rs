//! Sequential retry with optional exponential backoff.
//!
//! Both helpers invoke the work function up to `attempts` times, return on
//! the first success, check the token before every attempt, and — when all
//! attempts fail — report the error from the *last* attempt only. Earlier
//! errors are logged at debug level and discarded.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::context::Context;
use crate::error::{TaskError, TaskResult};

/// Invoke `f` up to `attempts` times (coerced to at least one), returning
/// immediately on the first success.
///
/// # Errors
///
/// The token's error if `ctx` is cancelled before an attempt, otherwise the
/// last attempt's error once every attempt has failed.
pub async fn retry<T, F, Fut>(ctx: &Context, attempts: u32, mut f: F) -> TaskResult<T>
where
    F: FnMut(Context) -> Fut,
    Fut: Future<Output = TaskResult<T>>,
{
    let attempts = attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        if let Some(err) = ctx.error() {
            return Err(err);
        }
        match f(ctx.clone()).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                debug!(attempt, attempts, error = %err, "attempt failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| TaskError::msg("retry exhausted without an attempt")))
}

/// Like [`retry`], but wait between failed attempts, doubling the delay
/// after every failure starting from `initial_delay`.
///
/// No wait follows the final attempt. The wait itself races the token: if
/// `ctx` fires mid-wait, the call returns the token's error immediately
/// instead of completing the wait.
///
/// # Errors
///
/// As [`retry`], plus the token's error when cancellation interrupts a
/// backoff wait.
pub async fn retry_with_backoff<T, F, Fut>(
    ctx: &Context,
    attempts: u32,
    initial_delay: Duration,
    mut f: F,
) -> TaskResult<T>
where
    F: FnMut(Context) -> Fut,
    Fut: Future<Output = TaskResult<T>>,
{
    let attempts = attempts.max(1);
    let mut delay = initial_delay;
    let mut last_err = None;
    for attempt in 1..=attempts {
        if let Some(err) = ctx.error() {
            return Err(err);
        }
        match f(ctx.clone()).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                debug!(attempt, attempts, delay_ms = delay.as_millis() as u64, error = %err, "attempt failed");
                last_err = Some(err);
            }
        }
        if attempt < attempts {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = ctx.cancelled() => {
                    return Err(ctx.error().unwrap_or(TaskError::Cancelled));
                }
            }
            delay *= 2;
        }
    }
    Err(last_err.unwrap_or_else(|| TaskError::msg("retry exhausted without an attempt")))
}
