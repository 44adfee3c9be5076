//! Fixed-interval background task scheduler.
//!
//! Runs one task on a dedicated thread at a fixed period. Used by the cache
//! builder to drive the expired-entry prune sweep and by the weak cache for
//! its dead-slot purge; the task has no idea it is periodic, it just
//! returns `true` to keep its slot.
//!
//! Shutdown paths, all of which retire the thread:
//!
//! - [`TaskHandle::cancel`]: idempotent, safe from any thread and after
//!   every other handle (or the cache itself) is gone. No new tick starts
//!   after it returns; an in-flight tick is allowed to finish first.
//! - The task returns `false`, which is how a sweep bound to a dropped cache
//!   retires itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

#[derive(Debug)]
struct HandleState {
    cancelled: AtomicBool,
    // Held while a tick runs and while the worker sleeps; `cancel` takes it
    // to fence out the next tick.
    run: Mutex<()>,
    signal: Condvar,
}

/// Cancellation handle for a scheduled task.
///
/// Cloning yields another handle to the same task. Dropping all handles
/// does not stop the task; only [`cancel`](TaskHandle::cancel) or the task
/// returning `false` does.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    state: Arc<HandleState>,
}

impl TaskHandle {
    /// Stops the task. Idempotent; returns after any in-flight tick has
    /// completed, and guarantees no further tick starts afterwards.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        // Wait out an in-flight tick, then wake the sleeper so it exits.
        let _fence = self.state.run.lock();
        self.state.signal.notify_all();
    }

    /// Returns `true` once [`cancel`](TaskHandle::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }
}

/// Spawns `task` on a named background thread, invoking it every `every`.
///
/// The task keeps running while it returns `true`; returning `false`
/// retires the thread.
pub fn spawn<F>(name: &'static str, every: Duration, mut task: F) -> TaskHandle
where
    F: FnMut() -> bool + Send + 'static,
{
    let state = Arc::new(HandleState {
        cancelled: AtomicBool::new(false),
        run: Mutex::new(()),
        signal: Condvar::new(),
    });
    let worker_state = Arc::clone(&state);

    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            debug!(task = name, period_ms = every.as_millis() as u64, "scheduler task started");
            loop {
                let mut guard = worker_state.run.lock();
                let deadline = Instant::now() + every;
                loop {
                    if worker_state.cancelled.load(Ordering::Acquire) {
                        drop(guard);
                        debug!(task = name, "scheduler task cancelled");
                        return;
                    }
                    if worker_state.signal.wait_until(&mut guard, deadline).timed_out() {
                        break;
                    }
                }
                if worker_state.cancelled.load(Ordering::Acquire) {
                    drop(guard);
                    debug!(task = name, "scheduler task cancelled");
                    return;
                }
                // Tick while still holding the run lock, so `cancel` can
                // fence out the next tick by acquiring it.
                if !task() {
                    drop(guard);
                    debug!(task = name, "scheduler task retired itself");
                    return;
                }
            }
        });
    if let Err(err) = spawned {
        // Thread spawn failing means the process is in deep trouble;
        // degrade to a cancelled handle rather than panicking the caller.
        debug!(task = name, %err, "failed to spawn scheduler thread");
        state.cancelled.store(true, Ordering::Release);
    }

    TaskHandle { state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn task_ticks_repeatedly() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = spawn("test-ticker", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        thread::sleep(Duration::from_millis(120));
        handle.cancel();
        assert!(ticks.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn cancel_stops_future_ticks_and_is_idempotent() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = spawn("test-cancel", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        thread::sleep(Duration::from_millis(30));
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        let after_cancel = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn cancel_before_first_tick_prevents_any_run() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = spawn("test-early-cancel", Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        handle.cancel();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn task_returning_false_retires_the_thread() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = spawn("test-retire", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst) < 2
        });

        thread::sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn clones_share_cancellation() {
        let handle = spawn("test-clone", Duration::from_secs(60), || true);
        let other = handle.clone();
        other.cancel();
        assert!(handle.is_cancelled());
    }
}
