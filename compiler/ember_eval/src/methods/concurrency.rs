//! Methods of promises, event emitters and workers.

use std::sync::Arc;

use super::{arg, expect_args, expect_callable, expect_str, optional_callable, MethodFn};
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::runtime::{promise, EventEmitter, Promise, Worker};
use crate::value::Value;

pub(super) fn promise_lookup(name: &str) -> Option<MethodFn> {
    let method: MethodFn = match name {
        "then" => promise_then,
        "catch" => promise_catch,
        "finally" => promise_finally,
        _ => return None,
    };
    Some(method)
}

pub(super) fn emitter_lookup(name: &str) -> Option<MethodFn> {
    let method: MethodFn = match name {
        "on" | "addListener" => emitter_on,
        "once" => emitter_once,
        "off" | "removeListener" => emitter_off,
        "removeAllListeners" => emitter_remove_all,
        "emit" => emitter_emit,
        "listenerCount" => emitter_listener_count,
        "eventNames" => emitter_event_names,
        _ => return None,
    };
    Some(method)
}

pub(super) fn worker_lookup(name: &str) -> Option<MethodFn> {
    let method: MethodFn = match name {
        "postMessage" => worker_post_message,
        "onMessage" | "on" => worker_on_message,
        "terminate" => worker_terminate,
        "isRunning" => worker_is_running,
        "done" => worker_done,
        _ => return None,
    };
    Some(method)
}

fn as_promise(receiver: &Value) -> Result<&Arc<Promise>, EvalError> {
    match receiver {
        Value::Promise(handle) => Ok(handle),
        other => Err(type_mismatch("PROMISE", other.type_name())),
    }
}

fn as_emitter(receiver: &Value) -> Result<&Arc<EventEmitter>, EvalError> {
    match receiver {
        Value::Emitter(handle) => Ok(handle),
        other => Err(type_mismatch("EVENT_EMITTER", other.type_name())),
    }
}

fn as_worker(receiver: &Value) -> Result<&Arc<Worker>, EvalError> {
    match receiver {
        Value::Worker(handle) => Ok(handle),
        other => Err(type_mismatch("WORKER", other.type_name())),
    }
}

// Promise

fn promise_then(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let on_fulfilled = optional_callable(args.first())?;
    let on_rejected = optional_callable(args.get(1))?;
    let derived = promise::then(interp, as_promise(receiver)?, on_fulfilled, on_rejected);
    Ok(Value::Promise(derived))
}

fn promise_catch(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let on_rejected = optional_callable(args.first())?;
    let derived = promise::then(interp, as_promise(receiver)?, None, on_rejected);
    Ok(Value::Promise(derived))
}

fn promise_finally(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("finally", &args, 1)?;
    let callback = expect_callable(&args[0])?;
    let derived = promise::finally(interp, as_promise(receiver)?, callback);
    Ok(Value::Promise(derived))
}

// EventEmitter

/// Returns the emitter, so registrations chain.
fn emitter_on(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("on", &args, 2)?;
    let event = expect_str(&args[0])?;
    let callback = expect_callable(&args[1])?;
    as_emitter(receiver)?.on(event, callback);
    Ok(receiver.clone())
}

fn emitter_once(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("once", &args, 2)?;
    let event = expect_str(&args[0])?;
    let callback = expect_callable(&args[1])?;
    as_emitter(receiver)?.once(event, callback);
    Ok(receiver.clone())
}

fn emitter_off(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("off", &args, 2)?;
    let event = expect_str(&args[0])?;
    as_emitter(receiver)?.off(event, &args[1]);
    Ok(receiver.clone())
}

fn emitter_remove_all(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let event = match args.first() {
        None | Some(Value::Null) => None,
        Some(event) => Some(expect_str(event)?),
    };
    as_emitter(receiver)?.remove_all(event);
    Ok(receiver.clone())
}

/// `emit(event, ...args)`: whether any listener was registered.
fn emitter_emit(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("emit", &args, 1)?;
    let event = expect_str(&args[0])?;
    let fired = as_emitter(receiver)?.emit(interp, event, &args[1..])?;
    Ok(Value::Bool(fired))
}

fn emitter_listener_count(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let event = arg(&args, 0);
    let event = expect_str(&event)?;
    Ok(Value::from(as_emitter(receiver)?.listener_count(event)))
}

fn emitter_event_names(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    let names = as_emitter(receiver)?
        .event_names()
        .into_iter()
        .map(Value::from)
        .collect();
    Ok(Value::array(names))
}

// Worker

fn worker_post_message(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    Ok(Value::Bool(as_worker(receiver)?.post_message(arg(&args, 0))))
}

fn worker_on_message(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("onMessage", &args, 1)?;
    let handler = expect_callable(&args[0])?;
    as_worker(receiver)?.on_message(interp, handler)?;
    Ok(Value::Null)
}

fn worker_terminate(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    as_worker(receiver)?.terminate();
    Ok(Value::Null)
}

fn worker_is_running(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    Ok(Value::Bool(as_worker(receiver)?.is_running()))
}

fn worker_done(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    Ok(Value::Promise(as_worker(receiver)?.done()))
}
