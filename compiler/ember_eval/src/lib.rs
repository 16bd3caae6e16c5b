//! Ember Eval - evaluator and concurrency runtime for Ember.
//!
//! # Architecture
//!
//! - `Value`: closed enum of every runtime value; aggregates are shared
//!   behind `Shared<T>` (`Arc<RwLock<T>>`) so closures and tasks see the
//!   same data
//! - `Environment`: chain of lock-protected frames, shared by closures and
//!   by concurrently running tasks
//! - `Interpreter`: cheap-to-clone handle that walks the syntax tree;
//!   `return`/`break`/`continue`/`throw` and engine errors unwind as the
//!   `Err` side of `EvalResult`
//! - `runtime`: promises, async calls, timers, event emitters and workers,
//!   each running on native threads counted by a task tracker
//! - `builtins` and `methods`: native functions, which call back into user
//!   code through [`Invoker`]

mod builtins;
mod diagnostics;
mod environment;
pub mod errors;
mod eval_mode;
mod exec;
pub mod interpreter;
mod methods;
mod operators;
mod print_handler;
pub mod runtime;
mod unary_operators;
pub mod value;

#[cfg(test)]
mod tests;

pub use environment::Environment;
pub use errors::{
    EvalBacktrace, EvalError, EvalErrorKind, EvalResult, RuntimeError, Signal,
};
pub use eval_mode::EvalMode;
pub use interpreter::{Interpreter, InterpreterBuilder, Invoker};
pub use operators::evaluate_binary;
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandlerImpl,
    SharedPrintHandler,
};
pub use unary_operators::evaluate_unary;
pub use value::{BuiltinFn, HashKey, Shared, Value};
