//! Evaluation modes.
//!
//! The command-line runner and the test harness want different policies for
//! output and recursion; `EvalMode` carries that choice and the interpreter
//! asks it through policy methods instead of checking the variant.

use crate::print_handler::{buffer_handler, stdout_handler, SharedPrintHandler};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// The `ember` binary: output to stdout.
    #[default]
    Interpret,
    /// Test execution: output captured, recursion tightly bounded.
    TestRun,
}

impl EvalMode {
    /// Whether `print` reaches the process's stdout.
    #[inline]
    pub fn allows_io(self) -> bool {
        matches!(self, Self::Interpret)
    }

    /// Maximum call depth per task.
    ///
    /// Always bounded: `stacker` keeps growing the stack of a runaway
    /// recursion until memory runs out.
    #[inline]
    pub fn max_recursion_depth(self) -> Option<usize> {
        match self {
            Self::Interpret => {
                #[cfg(target_arch = "wasm32")]
                {
                    Some(200)
                }
                #[cfg(not(target_arch = "wasm32"))]
                {
                    Some(10_000)
                }
            }
            Self::TestRun => Some(500),
        }
    }

    /// Print handler used when the embedder doesn't supply one.
    pub fn default_print_handler(self) -> SharedPrintHandler {
        if self.allows_io() {
            stdout_handler()
        } else {
            buffer_handler()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print_handler::PrintHandlerImpl;

    #[test]
    fn interpret_is_default() {
        assert_eq!(EvalMode::default(), EvalMode::Interpret);
    }

    #[test]
    fn test_run_buffers_output() {
        assert!(!EvalMode::TestRun.allows_io());
        assert!(matches!(
            *EvalMode::TestRun.default_print_handler(),
            PrintHandlerImpl::Buffer(_)
        ));
    }

    #[test]
    fn depth_limits() {
        assert_eq!(EvalMode::TestRun.max_recursion_depth(), Some(500));
        assert!(EvalMode::Interpret.max_recursion_depth().is_some());
    }
}
