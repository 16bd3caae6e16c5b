//! `setTimeout` / `setInterval`.
//!
//! Each timer is a task that parks in `recv_timeout` on its own cancellation
//! channel. A timeout firing invokes the callback; the sender being dropped
//! (by `clear*` or shutdown) wakes the task early and ends it. Cancellation
//! is best-effort: a callback already running is not interrupted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::errors::EvalError;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Handle returned by `setTimeout` / `setInterval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    pub id: u64,
    pub repeat: bool,
}

/// Active timers by id.
pub(crate) struct TimerRegistry {
    next_id: AtomicU64,
    active: DashMap<u64, Sender<()>>,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        TimerRegistry {
            next_id: AtomicU64::new(1),
            active: DashMap::new(),
        }
    }
}

impl TimerRegistry {
    fn register(&self) -> (u64, Receiver<()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (cancel, cancelled) = channel::bounded(1);
        self.active.insert(id, cancel);
        (id, cancelled)
    }

    /// Cancel timer `id`. Returns `false` if it already finished or was
    /// never registered.
    pub(crate) fn cancel(&self, id: u64) -> bool {
        match self.active.remove(&id) {
            Some((_, cancel)) => {
                let _ = cancel.try_send(());
                debug!(timer = id, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&self) {
        let ids: Vec<u64> = self.active.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.cancel(id);
        }
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// Delay in milliseconds to a `Duration`. Timeouts of zero or less fire
/// immediately; intervals are clamped to one millisecond.
fn delay(ms: f64, repeat: bool) -> Duration {
    let ms = if repeat {
        if ms >= 1.0 {
            ms
        } else {
            1.0
        }
    } else if ms > 0.0 {
        ms
    } else {
        return Duration::ZERO;
    };
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

/// Start a timer that invokes `callback(args...)` after `delay_ms`, once or
/// repeatedly.
pub(crate) fn schedule(
    interp: &Interpreter,
    callback: Value,
    delay_ms: f64,
    args: Vec<Value>,
    repeat: bool,
) -> Result<TimerHandle, EvalError> {
    let registry = &interp.runtime().timers;
    let (id, cancelled) = registry.register();
    let wait = delay(delay_ms, repeat);
    trace!(timer = id, ?wait, repeat, "timer scheduled");
    let spawned = interp.spawn_task("timer", move |interp| {
        loop {
            match cancelled.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {
                    trace!(timer = id, "timer fired");
                    if let Err(signal) = interp.invoke(&callback, args.clone()) {
                        interp.report_background(signal, "timer callback");
                    }
                    if !repeat {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        interp.runtime().timers.active.remove(&id);
    });
    if let Err(err) = spawned {
        registry.active.remove(&id);
        return Err(err);
    }
    Ok(TimerHandle { id, repeat })
}
