//! `InterpreterBuilder` for creating configured interpreters.

use std::sync::Arc;

use super::{Core, Interpreter};
use crate::builtins;
use crate::environment::Environment;
use crate::eval_mode::EvalMode;
use crate::print_handler::SharedPrintHandler;
use crate::runtime::Runtime;

/// Builder for [`Interpreter`].
///
/// The mode picks defaults for output and call depth; explicit settings
/// override them.
pub struct InterpreterBuilder {
    mode: EvalMode,
    print_handler: Option<SharedPrintHandler>,
    max_call_depth: Option<Option<usize>>,
    task_stack_size: usize,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            mode: EvalMode::default(),
            print_handler: None,
            max_call_depth: None,
            task_stack_size: 0,
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: EvalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Where `print` writes. Overrides the mode's default.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Maximum call depth per task; `None` disables the check.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = Some(depth);
        self
    }

    /// Stack size for task threads in bytes; zero uses the default.
    #[must_use]
    pub fn task_stack_size(mut self, bytes: usize) -> Self {
        self.task_stack_size = bytes;
        self
    }

    pub fn build(self) -> Interpreter {
        let globals = Environment::new_global();
        builtins::register(&globals);
        Interpreter {
            core: Arc::new(Core {
                globals,
                runtime: Runtime::default(),
                print_handler: self
                    .print_handler
                    .unwrap_or_else(|| self.mode.default_print_handler()),
                mode: self.mode,
                max_call_depth: self
                    .max_call_depth
                    .unwrap_or_else(|| self.mode.max_recursion_depth()),
                task_stack_size: self.task_stack_size,
            }),
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
