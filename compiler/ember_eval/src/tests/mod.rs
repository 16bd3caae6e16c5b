//! Evaluator tests driven by source text.
//!
//! Each test parses a snippet, runs it on a `TestRun` interpreter (bounded
//! depth, buffered output) and checks the result, the printed output or the
//! error.

#![allow(clippy::unwrap_used)]

mod builtins_tests;
mod concurrency_tests;
mod function_tests;

use std::time::Duration;

use crate::{EvalMode, Interpreter, RuntimeError, Value};

fn interpreter() -> Interpreter {
    Interpreter::builder().mode(EvalMode::TestRun).build()
}

fn run_in(interp: &Interpreter, src: &str) -> Result<Value, RuntimeError> {
    let program = ember_parse::parse(src).unwrap();
    interp.run(&program)
}

fn run(src: &str) -> Result<Value, RuntimeError> {
    run_in(&interpreter(), src)
}

/// Result of `src`, which must complete normally.
fn eval(src: &str) -> Value {
    match run(src) {
        Ok(value) => value,
        Err(err) => panic!("{src:?} failed: {err}"),
    }
}

/// Inspected result of `src`.
fn eval_inspect(src: &str) -> String {
    eval(src).inspect()
}

/// Engine error raised by `src`.
fn eval_err(src: &str) -> crate::EvalError {
    match run(src) {
        Err(RuntimeError::Eval(err)) => err,
        other => panic!("{src:?}: expected engine error, got {other:?}"),
    }
}

/// Everything `src` prints, after its background tasks finish.
fn output(src: &str) -> String {
    let interp = interpreter();
    if let Err(err) = run_in(&interp, src) {
        panic!("{src:?} failed: {err}");
    }
    assert!(
        interp.wait_for_tasks(Some(Duration::from_secs(10))),
        "background tasks did not finish"
    );
    interp.get_print_output()
}
