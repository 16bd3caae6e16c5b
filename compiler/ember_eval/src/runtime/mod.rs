//! Concurrency runtime.
//!
//! Async calls, promise reactions and combinators, timers and workers each
//! run on a native thread spawned through the [`TaskTracker`], so the host
//! can wait for outstanding work before exiting. Tasks re-enter the
//! evaluator against shared environments; every structure they share is
//! lock-protected.

mod emitter;
pub(crate) mod promise;
mod tasks;
pub(crate) mod timers;
pub(crate) mod worker;

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

pub use emitter::EventEmitter;
pub use promise::{Promise, PromiseState};
pub use timers::TimerHandle;
pub use worker::Worker;

use crate::errors::{describe_thrown, Signal};
use crate::value::Value;
use tasks::TaskTracker;
use timers::TimerRegistry;

/// How long tasks get to wind down after a forced shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

#[derive(Default)]
pub(crate) struct Runtime {
    pub(crate) tasks: TaskTracker,
    pub(crate) timers: TimerRegistry,
    workers: Mutex<Vec<Weak<Worker>>>,
    background_errors: Mutex<Vec<Value>>,
}

impl Runtime {
    pub(crate) fn register_worker(&self, worker: &Arc<Worker>) {
        let mut workers = self.workers.lock();
        workers.retain(|w| w.strong_count() > 0);
        workers.push(Arc::downgrade(worker));
    }

    pub(crate) fn terminate_workers(&self) {
        let workers: Vec<Arc<Worker>> =
            self.workers.lock().iter().filter_map(Weak::upgrade).collect();
        for worker in workers {
            worker.terminate();
        }
    }

    /// Wait for every task to finish. On timeout, cancel timers and
    /// terminate workers, then give tasks a short grace period.
    pub(crate) fn wait_for_tasks(&self, timeout: Option<Duration>) -> bool {
        if self.tasks.wait_idle(timeout) {
            return true;
        }
        warn!(
            live = self.tasks.live(),
            timers = self.timers.active_count(),
            "tasks still running at exit; cancelling timers and workers"
        );
        self.timers.cancel_all();
        self.terminate_workers();
        self.tasks.wait_idle(Some(SHUTDOWN_GRACE));
        false
    }

    /// Record an error that escaped a task with nobody to observe it.
    pub(crate) fn record_background_error(&self, signal: Signal, context: &str) {
        let thrown = match signal {
            Signal::Error(err) => err.to_value(),
            Signal::Throw(value) => value,
            Signal::Return(_) | Signal::Break | Signal::Continue => {
                debug!(context, "control-flow signal ignored in background task");
                return;
            }
        };
        warn!(context, error = %describe_thrown(&thrown), "uncaught error in background task");
        self.background_errors.lock().push(thrown);
    }

    pub(crate) fn background_errors(&self) -> Vec<Value> {
        self.background_errors.lock().clone()
    }
}
