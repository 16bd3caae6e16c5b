//! `Map` and `Set` methods.

use super::{arg, expect_args, expect_callable, MethodFn};
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{HashKey, OrderedMap, OrderedSet, Shared, Value};

pub(super) fn map_lookup(name: &str) -> Option<MethodFn> {
    let method: MethodFn = match name {
        "set" => map_set,
        "get" => map_get,
        "has" => map_has,
        "delete" => map_delete,
        "keys" => map_keys,
        "values" => map_values,
        "entries" => map_entries,
        "clear" => map_clear,
        "forEach" => map_for_each,
        _ => return None,
    };
    Some(method)
}

pub(super) fn set_lookup(name: &str) -> Option<MethodFn> {
    let method: MethodFn = match name {
        "add" => set_add,
        "has" => set_has,
        "delete" => set_delete,
        "values" | "keys" => set_values,
        "clear" => set_clear,
        "forEach" => set_for_each,
        _ => return None,
    };
    Some(method)
}

fn ordered_map(receiver: &Value) -> Result<&Shared<OrderedMap>, EvalError> {
    match receiver {
        Value::OrderedMap(map) => Ok(map),
        other => Err(type_mismatch("ES6MAP", other.type_name())),
    }
}

fn ordered_set(receiver: &Value) -> Result<&Shared<OrderedSet>, EvalError> {
    match receiver {
        Value::Set(set) => Ok(set),
        other => Err(type_mismatch("SET", other.type_name())),
    }
}

// Map

/// Returns the map, so calls chain.
fn map_set(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("set", &args, 2)?;
    let mut args = args.into_iter();
    let key = args.next().unwrap_or(Value::Null);
    let value = args.next().unwrap_or(Value::Null);
    let map = ordered_map(receiver)?;
    let hash = HashKey::of(&key);
    map.write().insert_keyed(hash, key, value);
    Ok(receiver.clone())
}

fn map_get(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let map = ordered_map(receiver)?;
    let hash = HashKey::of(&arg(&args, 0));
    Ok(map.read().get_keyed(&hash).cloned().unwrap_or(Value::Null))
}

fn map_has(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let map = ordered_map(receiver)?;
    let hash = HashKey::of(&arg(&args, 0));
    Ok(Value::Bool(map.read().contains_keyed(&hash)))
}

fn map_delete(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let map = ordered_map(receiver)?;
    let hash = HashKey::of(&arg(&args, 0));
    Ok(Value::Bool(map.write().remove_keyed(&hash)))
}

fn map_keys(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    let keys = ordered_map(receiver)?
        .read()
        .entries()
        .iter()
        .map(|(k, _)| k.clone())
        .collect();
    Ok(Value::array(keys))
}

fn map_values(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    let values = ordered_map(receiver)?
        .read()
        .entries()
        .iter()
        .map(|(_, v)| v.clone())
        .collect();
    Ok(Value::array(values))
}

fn map_entries(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    let entries = ordered_map(receiver)?
        .read()
        .entries()
        .iter()
        .map(|(k, v)| Value::array(vec![k.clone(), v.clone()]))
        .collect();
    Ok(Value::array(entries))
}

fn map_clear(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    ordered_map(receiver)?.write().clear();
    Ok(Value::Null)
}

/// `forEach(callback(value, key))`
fn map_for_each(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("forEach", &args, 1)?;
    let callback = expect_callable(&args[0])?;
    let entries = ordered_map(receiver)?.read().entries().to_vec();
    for (key, value) in entries {
        interp.invoke(&callback, vec![value, key])?;
    }
    Ok(Value::Null)
}

// Set

fn set_add(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let set = ordered_set(receiver)?;
    let value = arg(&args, 0);
    let hash = HashKey::of(&value);
    set.write().insert_keyed(hash, value);
    Ok(receiver.clone())
}

fn set_has(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let set = ordered_set(receiver)?;
    let hash = HashKey::of(&arg(&args, 0));
    Ok(Value::Bool(set.read().contains_keyed(&hash)))
}

fn set_delete(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let set = ordered_set(receiver)?;
    let hash = HashKey::of(&arg(&args, 0));
    Ok(Value::Bool(set.write().remove_keyed(&hash)))
}

fn set_values(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    Ok(Value::array(ordered_set(receiver)?.read().values().to_vec()))
}

fn set_clear(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    ordered_set(receiver)?.write().clear();
    Ok(Value::Null)
}

/// `forEach(callback(value, value))`, mirroring the Map callback shape.
fn set_for_each(interp: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    expect_args("forEach", &args, 1)?;
    let callback = expect_callable(&args[0])?;
    let values = ordered_set(receiver)?.read().values().to_vec();
    for value in values {
        interp.invoke(&callback, vec![value.clone(), value])?;
    }
    Ok(Value::Null)
}
