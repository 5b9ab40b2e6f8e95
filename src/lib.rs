//! # Asynckit
//!
//! Concurrency primitives and fan-out/fan-in combinators for tokio
//! workloads.
//!
//! This library is a small, reusable toolkit for orchestrating units of
//! async work: it owns task lifecycles, result ordering, and cooperative
//! cancellation so application code only supplies work functions and a
//! token.
//!
//! ## What's inside
//!
//! - **[`Promise`]** — an eager single async result: the task starts
//!   immediately, runs exactly once, and replays its cached outcome to
//!   every waiter.
//! - **[`dispatch()`] / [`dispatch_ctx`]** — fire-and-forget task launch for
//!   pure side effects, optionally short-circuited by an already-cancelled
//!   token.
//! - **[`all`] / [`all_settled`] / [`race`]** — multi-task orchestration.
//!   `all` joins everything and reports the first failure in input order;
//!   `all_settled` returns every outcome; `race` returns the first outcome
//!   and signals the losers.
//! - **[`map`] / [`for_each`] / [`pool`]** — concurrent collection
//!   processing, unbounded or drained by a fixed worker set.
//! - **[`retry()`] / [`retry_with_backoff`]** — sequential re-invocation with
//!   cancellation-aware exponential backoff waits.
//! - **[`with_timeout`]** — deadline enforcement for a single task.
//! - **[`Debouncer`] / [`Throttler`]** — call-frequency shaping.
//! - **[`once()`]** — single-execution memoization with result broadcast.
//!
//! ## Cancellation model
//!
//! A [`Context`] token is threaded explicitly through every call.
//! Cancellation is cooperative: a fired token unblocks the primitives' own
//! waits promptly, but a running task stops only by observing the token it
//! was handed. `all`-family operations always join every spawned task
//! before returning; `race` and `with_timeout` deliberately abandon
//! overrunning tasks in exchange for minimum latency.
//!
//! ## Example
//!
//! ```rust,ignore
//! use asynckit::{all, task_fn, Context};
//!
//! let ctx = Context::background();
//! let results = all(&ctx, vec![
//!     task_fn(|ctx| async move { load_profile(&ctx).await }),
//!     task_fn(|ctx| async move { load_orders(&ctx).await }),
//! ])
//! .await?;
//! ```

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Error taxonomy shared by every primitive.
pub mod error;
/// Cooperative cancellation and deadline tokens.
pub mod context;
/// Eager single async results.
pub mod promise;
/// Fire-and-forget task dispatch.
pub mod dispatch;
/// Fan-out/fan-in combinators.
pub mod combinators;
/// Concurrent collection processing.
pub mod collection;
/// Retry with exponential backoff.
pub mod retry;
/// Deadline enforcement.
pub mod timeout;
/// Debounce and throttle wrappers.
pub mod limiter;
/// Single-execution memoization.
pub mod once;
/// Shared utilities.
pub mod util;

pub use collection::{for_each, map, pool};
pub use combinators::{all, all_settled, race, task_fn, TaskFn};
pub use context::{CancelHandle, Context};
pub use dispatch::{dispatch, dispatch_ctx};
pub use error::{TaskError, TaskResult};
pub use limiter::{Debouncer, Throttler};
pub use once::{once, OnceTask};
pub use promise::Promise;
pub use retry::{retry, retry_with_backoff};
pub use timeout::with_timeout;
