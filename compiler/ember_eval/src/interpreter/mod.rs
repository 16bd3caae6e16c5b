//! Tree-walking interpreter for Ember.
//!
//! # Architecture
//!
//! `Interpreter` is a cheap handle around shared state (globals, runtime,
//! print handler, limits). Evaluation itself is stateless beyond the
//! environment passed to each call, so every spawned task simply clones the
//! handle and re-enters the evaluator.
//!
//! The evaluation code lives in `crate::exec`:
//!
//! - `exec::expr` - literals, operators, assignment
//! - `exec::control` - statements, loops, `try`, class declarations
//! - `exec::call` - calls, parameter binding, async calls, `new`
//! - `exec::member` - property, index and method access
//! - `exec::pattern` - destructuring

mod builder;

pub use builder::InterpreterBuilder;

use std::sync::Arc;
use std::time::Duration;

use ember_ir::Program;
use tracing::debug;

use crate::environment::Environment;
use crate::errors::{stray_control_flow, EvalError, EvalResult, RuntimeError, Signal};
use crate::eval_mode::EvalMode;
use crate::print_handler::SharedPrintHandler;
use crate::runtime::Runtime;
use crate::value::Value;

/// Call-back hook for native code that needs to call user functions.
pub trait Invoker {
    fn invoke(&self, callee: &Value, args: Vec<Value>) -> EvalResult;
}

struct Core {
    globals: Environment,
    runtime: Runtime,
    print_handler: SharedPrintHandler,
    mode: EvalMode,
    max_call_depth: Option<usize>,
    task_stack_size: usize,
}

#[derive(Clone)]
pub struct Interpreter {
    core: Arc<Core>,
}

impl Interpreter {
    /// Interpreter with default configuration.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn globals(&self) -> &Environment {
        &self.core.globals
    }

    pub fn mode(&self) -> EvalMode {
        self.core.mode
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.core.print_handler
    }

    /// Captured output when printing to a buffer; empty otherwise.
    pub fn get_print_output(&self) -> String {
        self.core.print_handler.get_output()
    }

    pub fn clear_print_output(&self) {
        self.core.print_handler.clear();
    }

    pub(crate) fn max_call_depth(&self) -> Option<usize> {
        self.core.max_call_depth
    }

    pub(crate) fn runtime(&self) -> &Runtime {
        &self.core.runtime
    }

    /// Run a program against the global environment. The result is the
    /// value of the last top-level statement.
    ///
    /// Background tasks the program started keep running; see
    /// [`Interpreter::wait_for_tasks`].
    pub fn run(&self, program: &Program) -> Result<Value, RuntimeError> {
        debug!(statements = program.body.len(), "running program");
        match self.exec_block(&program.body, &self.core.globals) {
            Ok(value) | Err(Signal::Return(value)) => Ok(value),
            Err(Signal::Break) => Err(RuntimeError::Eval(stray_control_flow("break"))),
            Err(Signal::Continue) => Err(RuntimeError::Eval(stray_control_flow("continue"))),
            Err(Signal::Error(err)) => Err(RuntimeError::Eval(err)),
            Err(Signal::Throw(value)) => Err(RuntimeError::Uncaught(value)),
        }
    }

    /// Block until every background task has finished, or `timeout`
    /// elapses. On timeout, timers are cancelled and workers terminated
    /// (best effort) and `false` is returned.
    pub fn wait_for_tasks(&self, timeout: Option<Duration>) -> bool {
        self.core.runtime.wait_for_tasks(timeout)
    }

    /// Errors thrown by timer callbacks, reactions and workers that nothing
    /// observed, in the order they happened.
    pub fn background_errors(&self) -> Vec<Value> {
        self.core.runtime.background_errors()
    }

    /// Spawn a counted background task with its own handle to this
    /// interpreter.
    pub(crate) fn spawn_task<F>(&self, kind: &str, task: F) -> Result<(), EvalError>
    where
        F: FnOnce(Interpreter) + Send + 'static,
    {
        let interp = self.clone();
        self.core
            .runtime
            .tasks
            .spawn(kind, self.core.task_stack_size, move || task(interp))
    }

    pub(crate) fn report_background(&self, signal: Signal, context: &str) {
        self.core.runtime.record_background_error(signal, context);
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoker for Interpreter {
    fn invoke(&self, callee: &Value, args: Vec<Value>) -> EvalResult {
        Interpreter::invoke(self, callee, args)
    }
}
