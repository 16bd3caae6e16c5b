//! `Map` and `Set` constructors.

use crate::errors::{type_mismatch, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{OrderedMap, OrderedSet, Value};

/// `new Map(entries?)`, where `entries` is an array of `[key, value]` pairs.
pub(super) fn map(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    let mut map = OrderedMap::new();
    match args.first() {
        None | Some(Value::Null) => {}
        Some(Value::Array(entries)) => {
            for entry in entries.snapshot() {
                let Value::Array(pair) = &entry else {
                    return Err(type_mismatch("ARRAY", entry.type_name()).into());
                };
                let pair = pair.snapshot();
                let mut pair = pair.into_iter();
                let key = pair.next().unwrap_or(Value::Null);
                let value = pair.next().unwrap_or(Value::Null);
                map.insert(key, value);
            }
        }
        Some(other) => return Err(type_mismatch("ARRAY", other.type_name()).into()),
    }
    Ok(Value::ordered_map(map))
}

/// `new Set(values?)`; duplicates collapse to their first occurrence.
pub(super) fn set(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    let mut set = OrderedSet::new();
    match args.first() {
        None | Some(Value::Null) => {}
        Some(Value::Array(values)) => {
            for value in values.snapshot() {
                set.insert(value);
            }
        }
        Some(other) => return Err(type_mismatch("ARRAY", other.type_name()).into()),
    }
    Ok(Value::set(set))
}
