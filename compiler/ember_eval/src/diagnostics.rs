//! Call-stack tracking for the evaluator.
//!
//! Every task runs on its own native thread, so the live call stack is
//! thread-local: a function call pushes a [`CallFrame`] through
//! [`CallStack::enter`] and the returned guard pops it on drop, including
//! on early return through `?`. The depth check is integrated into `enter`.
//! When an error leaves a function, [`CallStack::capture`] snapshots the
//! frames into the error's backtrace.

use std::cell::RefCell;

use ember_ir::{Name, Span};

use crate::errors::{stack_overflow, BacktraceFrame, EvalBacktrace, EvalError};

/// Per-call metadata.
#[derive(Clone, Debug)]
pub(crate) struct CallFrame {
    pub name: Name,
    /// Call site, not the definition.
    pub call_span: Option<Span>,
}

thread_local! {
    static FRAMES: RefCell<Vec<CallFrame>> = const { RefCell::new(Vec::new()) };
}

pub(crate) struct CallStack;

impl CallStack {
    /// Push a frame, failing with `StackOverflow` when `max_depth` frames are
    /// already live on this thread. The frame is not pushed on overflow.
    pub(crate) fn enter(
        frame: CallFrame,
        max_depth: Option<usize>,
    ) -> Result<FrameGuard, EvalError> {
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            if let Some(max) = max_depth {
                if frames.len() >= max {
                    return Err(stack_overflow(max));
                }
            }
            frames.push(frame);
            Ok(FrameGuard { _private: () })
        })
    }

    /// Live frames on the current thread.
    #[cfg(test)]
    pub(crate) fn depth() -> usize {
        FRAMES.with(|frames| frames.borrow().len())
    }

    /// Snapshot of the current thread's stack, most recent call first.
    pub(crate) fn capture() -> EvalBacktrace {
        FRAMES.with(|frames| {
            EvalBacktrace::new(
                frames
                    .borrow()
                    .iter()
                    .rev()
                    .map(|f| BacktraceFrame {
                        name: f.name.to_string(),
                        span: f.call_span,
                    })
                    .collect(),
            )
        })
    }
}

/// Pops its frame when dropped.
#[must_use]
pub(crate) struct FrameGuard {
    _private: (),
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}
