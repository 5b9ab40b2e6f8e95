//! Call-frequency limiters: debounce and throttle.
//!
//! Both wrappers own their state for the wrapper's lifetime and are safe to
//! invoke from concurrent callers. The wrapped callback always fires as a
//! detached task; neither wrapper exposes the callback's completion.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Suppress rapid call bursts, firing only after a quiet period.
///
/// Every [`call`](Debouncer::call) cancels the pending deferred execution
/// and arms a new one `wait` in the future; the callback fires only when
/// `wait` elapses with no intervening call.
pub struct Debouncer<F> {
    wait: Duration,
    callback: Arc<F>,
    /// Cancel signal for the single pending timer task. Replaced, and the
    /// stale timer cancelled, on every call.
    pending: Mutex<Option<oneshot::Sender<()>>>,
}

impl<F, Fut> Debouncer<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Wrap `callback` with a debounce window of `wait`.
    pub fn new(wait: Duration, callback: F) -> Self {
        Self {
            wait,
            callback: Arc::new(callback),
            pending: Mutex::new(None),
        }
    }

    /// Record a trigger: cancel any pending deferred execution and arm a
    /// new one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call(&self) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if let Some(stale) = pending.replace(cancel_tx) {
                let _ = stale.send(());
            }
        }

        let callback = Arc::clone(&self.callback);
        let wait = self.wait;
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(wait) => callback().await,
                _ = cancel_rx => {}
            }
        });
    }
}

/// Cap firing frequency to at most once per `interval`, dropping excess
/// calls.
///
/// A call fires the callback immediately when at least `interval` has
/// elapsed since the last fire; earlier calls are dropped silently — no
/// queuing and no trailing call.
pub struct Throttler<F> {
    interval: Duration,
    callback: Arc<F>,
    last_fired: Mutex<Option<Instant>>,
}

impl<F, Fut> Throttler<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Wrap `callback` with a minimum firing interval.
    pub fn new(interval: Duration, callback: F) -> Self {
        Self {
            interval,
            callback: Arc::new(callback),
            last_fired: Mutex::new(None),
        }
    }

    /// Fire the callback as a detached task if the interval has elapsed;
    /// drop the call otherwise.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call(&self) {
        let now = Instant::now();
        {
            let mut last_fired = self.last_fired.lock();
            let due = last_fired.map_or(true, |last| now.duration_since(last) >= self.interval);
            if !due {
                return;
            }
            *last_fired = Some(now);
        }
        let callback = Arc::clone(&self.callback);
        tokio::spawn(async move { callback().await });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn debounce_collapses_a_burst_to_one_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let debouncer = Debouncer::new(Duration::from_millis(50), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        for _ in 0..5 {
            debouncer.call();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn debounce_fires_again_after_quiet_period() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let debouncer = Debouncer::new(Duration::from_millis(20), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        debouncer.call();
        tokio::time::sleep(Duration::from_millis(60)).await;
        debouncer.call();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn throttle_fires_immediately_then_drops() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let throttler = Throttler::new(Duration::from_millis(100), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        throttler.call();
        throttler.call();
        throttler.call();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn throttle_fires_again_after_the_interval() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let throttler = Throttler::new(Duration::from_millis(30), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        throttler.call();
        tokio::time::sleep(Duration::from_millis(50)).await;
        throttler.call();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
