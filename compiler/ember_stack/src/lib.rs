//! Stack safety for deep recursion and task threads.
//!
//! The parser and the evaluator both recurse once per nested syntax node,
//! and every evaluator task (async call, timer, worker) runs on its own
//! native thread. Two things keep them from overflowing:
//!
//! - [`ensure_sufficient_stack`] grows the current stack on demand before a
//!   recursive step.
//! - [`task_thread`] builds the `std::thread::Builder` used for every spawned
//!   task, with a stack large enough that growth is rarely needed.

use std::thread;

/// Minimum stack space to keep available before recursing (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Stack space added per growth step (1MB).
const GROWTH: usize = 1024 * 1024;

/// Default stack size for evaluator task threads (8MB).
pub const DEFAULT_TASK_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

/// WASM manages its own stack; just call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Thread builder for an evaluator task.
///
/// `stack_size` of zero falls back to [`DEFAULT_TASK_STACK_SIZE`].
pub fn task_thread(name: impl Into<String>, stack_size: usize) -> thread::Builder {
    let size = if stack_size == 0 {
        DEFAULT_TASK_STACK_SIZE
    } else {
        stack_size
    };
    thread::Builder::new().name(name.into()).stack_size(size)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn depth(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
    }

    #[test]
    fn deep_recursion_grows_the_stack() {
        assert_eq!(depth(200_000), 200_000);
    }

    #[test]
    fn task_thread_runs_closure() {
        let handle = task_thread("ember-test", 0).spawn(|| depth(50_000)).unwrap();
        assert_eq!(handle.join().unwrap(), 50_000);
    }

    #[test]
    fn task_thread_keeps_name() {
        let handle = task_thread("ember-named", 64 * 1024)
            .spawn(|| thread::current().name().map(str::to_owned))
            .unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some("ember-named"));
    }
}
