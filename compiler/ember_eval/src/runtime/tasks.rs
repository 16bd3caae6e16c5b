//! Live-task accounting.
//!
//! Every background task is a native thread. The tracker counts them so the
//! host can wait for the program to go quiet before exiting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ember_stack::task_thread;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::errors::EvalError;

#[derive(Default)]
struct TaskState {
    live: Mutex<usize>,
    idle: Condvar,
}

#[derive(Default)]
pub(crate) struct TaskTracker {
    state: Arc<TaskState>,
    next_id: AtomicU64,
}

/// Decrements the live count when the task's closure returns or unwinds.
struct TaskGuard(Arc<TaskState>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let mut live = self.0.live.lock();
        *live = live.saturating_sub(1);
        if *live == 0 {
            self.0.idle.notify_all();
        }
    }
}

impl TaskTracker {
    /// Run `task` on a new thread named `ember-{kind}-{n}`.
    pub(crate) fn spawn<F>(&self, kind: &str, stack_size: usize, task: F) -> Result<(), EvalError>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = format!("ember-{kind}-{id}");
        *self.state.live.lock() += 1;
        let guard = TaskGuard(Arc::clone(&self.state));
        trace!(task = %name, "spawning task");
        let spawned = task_thread(name.clone(), stack_size).spawn(move || {
            let _guard = guard;
            task();
            trace!("task finished");
        });
        match spawned {
            Ok(_) => Ok(()),
            // The closure (and the guard inside it) was dropped, so the count
            // is already back down.
            Err(err) => Err(EvalError::new(format!("failed to spawn task {name}: {err}"))),
        }
    }

    pub(crate) fn live(&self) -> usize {
        *self.state.live.lock()
    }

    /// Block until no task is live. Returns `false` if `timeout` elapsed
    /// first.
    pub(crate) fn wait_idle(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut live = self.state.live.lock();
        while *live > 0 {
            match deadline {
                Some(deadline) => {
                    if self.state.idle.wait_until(&mut live, deadline).timed_out() {
                        debug!(live = *live, "timed out waiting for tasks");
                        return *live == 0;
                    }
                }
                None => self.state.idle.wait(&mut live),
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use super::*;

    #[test]
    fn waits_for_all_tasks() {
        let tracker = TaskTracker::default();
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            let done = Arc::clone(&done);
            tracker
                .spawn("test", 0, move || {
                    thread::sleep(Duration::from_millis(20));
                    done.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }
        assert!(tracker.wait_idle(Some(Duration::from_secs(5))));
        assert_eq!(done.load(Ordering::SeqCst), 4);
        assert_eq!(tracker.live(), 0);
    }

    #[test]
    fn wait_times_out_on_stuck_task() {
        let tracker = TaskTracker::default();
        let (tx, rx) = crossbeam::channel::bounded::<()>(0);
        tracker
            .spawn("stuck", 0, move || {
                let _ = rx.recv();
            })
            .unwrap();
        assert!(!tracker.wait_idle(Some(Duration::from_millis(30))));
        drop(tx);
        assert!(tracker.wait_idle(Some(Duration::from_secs(5))));
    }

    #[test]
    fn task_threads_are_named() {
        let tracker = TaskTracker::default();
        let (tx, rx) = crossbeam::channel::bounded(1);
        tracker
            .spawn("named", 0, move || {
                let _ = tx.send(thread::current().name().map(str::to_owned));
            })
            .unwrap();
        let name = rx.recv().unwrap().unwrap();
        assert!(name.starts_with("ember-named-"));
    }
}
