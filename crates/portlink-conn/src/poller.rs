use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::debug;

/// A cancellable fixed-delay periodic task.
///
/// The closure runs immediately on spawn, then again `delay` after the end
/// of each run, so a slow run never causes overlapping or bunched runs.
/// Cancellation is cooperative: it stops future runs but never interrupts
/// one in progress. Dropping the task cancels it and joins the worker, which
/// waits out at most the run currently executing.
pub struct PollTask {
    shared: Arc<Shared>,
    handle: Option<thread::JoinHandle<()>>,
}

struct Shared {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl Shared {
    fn cancelled(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PollTask {
    /// Spawn the worker thread and run `tick` immediately.
    pub fn spawn<F>(delay: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            cancelled: Mutex::new(false),
            wake: Condvar::new(),
        });
        let worker = Arc::clone(&shared);

        let handle = thread::spawn(move || loop {
            if *worker.cancelled() {
                break;
            }
            tick();

            // Fixed delay: measured from the end of this run. A cancel
            // during the wait wakes the worker so it exits promptly.
            let guard = worker.cancelled();
            let (guard, _) = worker
                .wake
                .wait_timeout_while(guard, delay, |stop| !*stop)
                .unwrap_or_else(PoisonError::into_inner);
            if *guard {
                break;
            }
        });

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Stop scheduling future runs without waiting for one in progress.
    pub fn cancel(&self) {
        *self.shared.cancelled() = true;
        self.shared.wake.notify_all();
        debug!("poll task cancelled");
    }

    /// Whether the task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.shared.cancelled()
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use super::*;

    fn wait_until(timeout: Duration, mut probe: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if probe() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn first_run_is_immediate() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = PollTask::spawn(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(wait_until(Duration::from_secs(2), || {
            runs.load(Ordering::SeqCst) == 1
        }));
        drop(task);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn runs_repeat_after_the_delay() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let _task = PollTask::spawn(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(wait_until(Duration::from_secs(2), || {
            runs.load(Ordering::SeqCst) >= 3
        }));
    }

    #[test]
    fn cancel_stops_future_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = PollTask::spawn(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(wait_until(Duration::from_secs(2), || {
            runs.load(Ordering::SeqCst) >= 2
        }));
        task.cancel();
        assert!(task.is_cancelled());

        // Allow a run that was already past its cancellation check to end.
        thread::sleep(Duration::from_millis(50));
        let settled = runs.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(runs.load(Ordering::SeqCst), settled);
    }

    #[test]
    fn drop_waits_for_the_run_in_progress() {
        let entered = Arc::new(AtomicUsize::new(0));
        let exited = Arc::new(AtomicUsize::new(0));
        let (enter, exit) = (Arc::clone(&entered), Arc::clone(&exited));

        let task = PollTask::spawn(Duration::from_secs(60), move || {
            enter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(100));
            exit.fetch_add(1, Ordering::SeqCst);
        });

        assert!(wait_until(Duration::from_secs(2), || {
            entered.load(Ordering::SeqCst) == 1
        }));
        drop(task);
        assert_eq!(exited.load(Ordering::SeqCst), 1);
    }
}
