//! `Promise`, timers, `EventEmitter`, `Worker` and `sleep`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::errors::{arity_mismatch, type_mismatch, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::methods::{arg, expect_args, expect_callable, expect_number};
use crate::runtime::{promise, timers, worker, EventEmitter, Promise};
use crate::value::{BuiltinFn, BuiltinValue, Value};

/// The global `Promise`: constructor plus its static combinators.
pub(super) fn promise_constructor() -> Value {
    let statics: [(&str, BuiltinFn); 5] = [
        ("resolve", promise_resolve),
        ("reject", promise_reject),
        ("all", promise_all),
        ("allSettled", promise_all_settled),
        ("race", promise_race),
    ];
    let ctor = statics
        .into_iter()
        .fold(BuiltinValue::new("Promise", new_promise), |ctor, (name, func)| {
            ctor.with_static(name, Value::builtin(BuiltinValue::new(name, func)))
        });
    Value::builtin(ctor)
}

/// `new Promise(executor)`: the executor runs synchronously with
/// `resolve`/`reject` callables; a throw from it rejects the promise.
fn new_promise(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("Promise", &args, 1)?;
    let executor = expect_callable(&args[0])?;
    let promise = Arc::new(Promise::new());
    let handle = Value::Promise(Arc::clone(&promise));
    let resolve = BuiltinValue::new("resolve", settle_fulfilled).with_bound(vec![handle.clone()]);
    let reject = BuiltinValue::new("reject", settle_rejected).with_bound(vec![handle.clone()]);
    let settlers = vec![Value::builtin(resolve), Value::builtin(reject)];
    if let Err(signal) = interp.invoke(&executor, settlers) {
        promise.reject(signal.into_thrown()?);
    }
    Ok(handle)
}

/// Bound `resolve`: `[promise, value]`.
fn settle_fulfilled(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    if let Value::Promise(promise) = arg(&args, 0) {
        promise.resolve(arg(&args, 1));
    }
    Ok(Value::Null)
}

/// Bound `reject`: `[promise, reason]`.
fn settle_rejected(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    if let Value::Promise(promise) = arg(&args, 0) {
        promise.reject(arg(&args, 1));
    }
    Ok(Value::Null)
}

/// `Promise.resolve(v)`: a promise argument is returned as is.
fn promise_resolve(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    match arg(&args, 0) {
        promise @ Value::Promise(_) => Ok(promise),
        value => Ok(Value::Promise(Arc::new(Promise::fulfilled(value)))),
    }
}

fn promise_reject(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    Ok(Value::Promise(Arc::new(Promise::rejected(arg(&args, 0)))))
}

fn input_array(name: &str, args: &[Value]) -> Result<Vec<Value>, EvalError> {
    match args.first() {
        Some(Value::Array(items)) => Ok(items.snapshot()),
        Some(other) => Err(type_mismatch("ARRAY", other.type_name())),
        None => Err(arity_mismatch(name, 1, 0)),
    }
}

fn promise_all(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    let items = input_array("Promise.all", &args)?;
    Ok(Value::Promise(promise::all(interp, items)))
}

fn promise_all_settled(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    let items = input_array("Promise.allSettled", &args)?;
    Ok(Value::Promise(promise::all_settled(interp, items)))
}

fn promise_race(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    let items = input_array("Promise.race", &args)?;
    Ok(Value::Promise(promise::race(items)))
}

// Timers

fn start_timer(interp: &Interpreter, name: &str, args: Vec<Value>, repeat: bool) -> EvalResult {
    expect_args(name, &args, 1)?;
    let callback = expect_callable(&args[0])?;
    let delay_ms = match args.get(1) {
        None | Some(Value::Null) => 0.0,
        Some(delay) => expect_number(delay)?,
    };
    let extra = args.get(2..).map(<[Value]>::to_vec).unwrap_or_default();
    let handle = timers::schedule(interp, callback, delay_ms, extra, repeat)?;
    Ok(Value::Timer(handle))
}

/// `setTimeout(callback, delayMs, ...args)`
pub(super) fn set_timeout(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    start_timer(interp, "setTimeout", args, false)
}

/// `setInterval(callback, delayMs, ...args)`
pub(super) fn set_interval(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    start_timer(interp, "setInterval", args, true)
}

/// `clearTimeout(timer)` / `clearInterval(timer)`: accepts the timer value
/// or its numeric id. Clearing an unknown or finished timer is a no-op.
pub(super) fn clear_timer(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    let id = match arg(&args, 0) {
        Value::Timer(handle) => handle.id,
        Value::Number(n) if n >= 1.0 && n.fract() == 0.0 => n as u64,
        Value::Number(_) | Value::Null => return Ok(Value::Bool(false)),
        other => return Err(type_mismatch("TIMER", other.type_name()).into()),
    };
    Ok(Value::Bool(interp.runtime().timers.cancel(id)))
}

/// `sleep(ms)`: blocks the calling task. Zero, negative and NaN delays
/// return at once; a delay no `Duration` can hold is an error.
pub(super) fn sleep(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("sleep", &args, 1)?;
    let ms = expect_number(&args[0])?;
    if ms.is_nan() || ms <= 0.0 {
        return Ok(Value::Null);
    }
    let duration = Duration::try_from_secs_f64(ms / 1000.0)
        .map_err(|_| EvalError::new(format!("sleep: delay of {ms}ms is out of range")))?;
    thread::sleep(duration);
    Ok(Value::Null)
}

pub(super) fn event_emitter(_: &Interpreter, _: Vec<Value>) -> EvalResult {
    Ok(Value::Emitter(Arc::new(EventEmitter::new())))
}

/// `new Worker(body, data?)`
pub(super) fn new_worker(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("Worker", &args, 1)?;
    let handle = worker::spawn(interp, &args[0], arg(&args, 1))?;
    Ok(Value::Worker(handle))
}
