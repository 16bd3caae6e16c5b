//! Methods and properties of native values.
//!
//! Each receiver kind has a resolver mapping a method name to a
//! [`MethodFn`]. The same table serves calls (`xs.push(1)`) and method
//! values (`let push = xs.push`), which become a builtin bound to the
//! receiver and the method name.

mod array;
mod collections;
mod concurrency;
mod string;

use std::sync::Arc;

use crate::errors::{arity_mismatch, type_mismatch, undefined_property, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{BuiltinValue, Value};

/// Native method: interpreter, receiver, arguments.
pub(crate) type MethodFn = fn(&Interpreter, &Value, Vec<Value>) -> EvalResult;

fn lookup(receiver: &Value, name: &str) -> Option<MethodFn> {
    match receiver {
        Value::Array(_) => array::lookup(name),
        Value::Str(_) => string::lookup(name),
        Value::OrderedMap(_) => collections::map_lookup(name),
        Value::Set(_) => collections::set_lookup(name),
        Value::Promise(_) => concurrency::promise_lookup(name),
        Value::Emitter(_) => concurrency::emitter_lookup(name),
        Value::Worker(_) => concurrency::worker_lookup(name),
        _ => None,
    }
}

/// Non-method properties: `length`, `size`, `state`, `id`.
fn property(receiver: &Value, name: &str) -> Option<Value> {
    match (receiver, name) {
        (Value::Array(items), "length") => Some(Value::from(items.read().len())),
        (Value::Str(s), "length") => Some(Value::from(s.chars().count())),
        (Value::OrderedMap(map), "size") => Some(Value::from(map.read().len())),
        (Value::Set(set), "size") => Some(Value::from(set.read().len())),
        (Value::Promise(p), "state") => Some(Value::from(p.state().label())),
        (Value::Timer(t), "id") => Some(Value::Number(t.id as f64)),
        (Value::Worker(w), "id") => Some(Value::Number(w.id() as f64)),
        _ => None,
    }
}

/// `receiver.name` for native values: a property, or the method bound to
/// the receiver.
pub(crate) fn get_property(receiver: &Value, name: &str) -> Option<Value> {
    property(receiver, name).or_else(|| {
        lookup(receiver, name).map(|_| {
            Value::Builtin(Arc::new(
                BuiltinValue::new(name, call_bound_method)
                    .with_bound(vec![receiver.clone(), Value::from(name)]),
            ))
        })
    })
}

pub(crate) fn call_method(
    interp: &Interpreter,
    receiver: &Value,
    name: &str,
    args: Vec<Value>,
) -> EvalResult {
    match lookup(receiver, name) {
        Some(method) => method(interp, receiver, args),
        None => Err(undefined_property(name, receiver.type_name()).into()),
    }
}

/// Target of method values: bound `[receiver, name]`, then the arguments.
fn call_bound_method(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    let mut args = args.into_iter();
    let receiver = args.next().unwrap_or(Value::Null);
    let name = args.next().unwrap_or(Value::Null);
    call_method(interp, &receiver, name.as_str().unwrap_or_default(), args.collect())
}

// Argument helpers shared with the global builtins.

/// Argument `i`, or `null` if not supplied.
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Null)
}

pub(crate) fn expect_args(name: &str, args: &[Value], required: usize) -> Result<(), EvalError> {
    if args.len() < required {
        return Err(arity_mismatch(name, required, args.len()));
    }
    Ok(())
}

pub(crate) fn expect_callable(value: &Value) -> Result<Value, EvalError> {
    if value.is_callable() {
        Ok(value.clone())
    } else {
        Err(type_mismatch("FUNCTION", value.type_name()))
    }
}

pub(crate) fn expect_number(value: &Value) -> Result<f64, EvalError> {
    value
        .as_number()
        .ok_or_else(|| type_mismatch("NUMBER", value.type_name()))
}

pub(crate) fn expect_str(value: &Value) -> Result<&str, EvalError> {
    value
        .as_str()
        .ok_or_else(|| type_mismatch("STRING", value.type_name()))
}

/// Optional callback argument: absent or `null` means none.
pub(crate) fn optional_callable(value: Option<&Value>) -> Result<Option<Value>, EvalError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => expect_callable(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::errors::Signal;
    use crate::EvalMode;

    #[test]
    fn mismatched_receiver_is_a_type_error() {
        let interp = Interpreter::builder().mode(EvalMode::TestRun).build();
        let cases = [
            (Value::from("s"), array::lookup("push")),
            (Value::array(vec![]), collections::map_lookup("get")),
            (Value::Null, collections::set_lookup("add")),
            (Value::Number(1.0), concurrency::promise_lookup("then")),
            (Value::Null, concurrency::emitter_lookup("eventNames")),
            (Value::Bool(true), concurrency::worker_lookup("isRunning")),
        ];
        for (receiver, method) in cases {
            let method = method.unwrap();
            match method(&interp, &receiver, vec![Value::Null]) {
                Err(Signal::Error(err)) => assert!(err.kind.is_type_mismatch(), "{err}"),
                other => panic!("{receiver:?}: expected a type error, got {other:?}"),
            }
        }
    }
}
