//! Array methods. Callback-taking methods iterate a snapshot, so a
//! callback may mutate the array without deadlocking or invalidating the
//! walk.

use super::{arg, expect_args, expect_callable, expect_number, MethodFn};
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Shared, Value};

pub(super) fn lookup(name: &str) -> Option<MethodFn> {
    let method: MethodFn = match name {
        "push" => push,
        "pop" => pop,
        "map" => map,
        "filter" => filter,
        "forEach" => for_each,
        "reduce" => reduce,
        "join" => join,
        "includes" => includes,
        "indexOf" => index_of,
        "slice" => slice,
        _ => return None,
    };
    Some(method)
}

fn items(receiver: &Value) -> Result<&Shared<Vec<Value>>, EvalError> {
    match receiver {
        Value::Array(items) => Ok(items),
        other => Err(type_mismatch("ARRAY", other.type_name())),
    }
}

fn push(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let mut items = items(receiver)?.write();
    items.extend(args);
    Ok(Value::from(items.len()))
}

fn pop(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    Ok(items(receiver)?.write().pop().unwrap_or(Value::Null))
}

fn map(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("map", &args, 1)?;
    let callback = expect_callable(&args[0])?;
    let snapshot = items(receiver)?.snapshot();
    let mut out = Vec::with_capacity(snapshot.len());
    for (i, item) in snapshot.into_iter().enumerate() {
        out.push(interp.invoke(&callback, vec![item, Value::from(i)])?);
    }
    Ok(Value::array(out))
}

fn filter(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("filter", &args, 1)?;
    let callback = expect_callable(&args[0])?;
    let mut out = Vec::new();
    for (i, item) in items(receiver)?.snapshot().into_iter().enumerate() {
        if interp
            .invoke(&callback, vec![item.clone(), Value::from(i)])?
            .is_truthy()
        {
            out.push(item);
        }
    }
    Ok(Value::array(out))
}

fn for_each(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("forEach", &args, 1)?;
    let callback = expect_callable(&args[0])?;
    for (i, item) in items(receiver)?.snapshot().into_iter().enumerate() {
        interp.invoke(&callback, vec![item, Value::from(i)])?;
    }
    Ok(Value::Null)
}

/// `reduce(callback(acc, item, index), initial?)`; without an initial value
/// the first element seeds the accumulator.
fn reduce(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("reduce", &args, 1)?;
    let callback = expect_callable(&args[0])?;
    let snapshot = items(receiver)?.snapshot();
    let mut indexed = snapshot.into_iter().enumerate();
    let mut acc = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match indexed.next() {
            Some((_, first)) => first,
            None => {
                return Err(EvalError::new("reduce of empty array with no initial value").into())
            }
        },
    };
    for (i, item) in indexed {
        acc = interp.invoke(&callback, vec![acc, item, Value::from(i)])?;
    }
    Ok(acc)
}

fn join(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let separator = match args.first() {
        None | Some(Value::Null) => ",".to_owned(),
        Some(sep) => sep.to_string(),
    };
    let parts: Vec<String> = items(receiver)?
        .snapshot()
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(Value::string(parts.join(&separator)))
}

fn includes(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let needle = arg(&args, 0);
    let found = items(receiver)?.read().iter().any(|item| {
        item == &needle
            || matches!(
                (item, &needle),
                (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan()
            )
    });
    Ok(Value::Bool(found))
}

fn index_of(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let needle = arg(&args, 0);
    let position = items(receiver)?.read().iter().position(|item| item == &needle);
    Ok(position.map_or(Value::Number(-1.0), Value::from))
}

/// Resolve a possibly negative `slice` bound against `len`.
fn slice_bound(value: Option<&Value>, len: usize, default: usize) -> Result<usize, EvalError> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(value) => {
            let n = expect_number(value)?.trunc();
            let len_f = len as f64;
            let resolved = if n < 0.0 { (len_f + n).max(0.0) } else { n.min(len_f) };
            Ok(resolved as usize)
        }
    }
}

fn slice(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let items = items(receiver)?.read();
    let len = items.len();
    let start = slice_bound(args.first(), len, 0)?;
    let end = slice_bound(args.get(1), len, len)?;
    let out = if start < end {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(Value::array(out))
}
