//! Output, inspection and error construction.

use crate::diagnostics::CallStack;
use crate::errors::{error_object, type_mismatch, EvalResult};
use crate::interpreter::Interpreter;
use crate::methods::{arg, expect_args};
use crate::value::Value;

/// `print(...values)`: display forms joined by a space, then a newline.
pub(super) fn print(interp: &Interpreter, args: Vec<Value>) -> EvalResult {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    interp.print_handler().println(&line);
    Ok(Value::Null)
}

pub(super) fn len(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("len", &args, 1)?;
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::Array(items) => items.read().len(),
        Value::Map(fields) => fields.read().len(),
        Value::OrderedMap(map) => map.read().len(),
        Value::Set(set) => set.read().len(),
        other => return Err(type_mismatch("STRING, ARRAY or MAP", other.type_name()).into()),
    };
    Ok(Value::from(n))
}

pub(super) fn type_of(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("typeof", &args, 1)?;
    Ok(Value::from(args[0].type_name()))
}

pub(super) fn to_str(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("str", &args, 1)?;
    Ok(Value::string(args[0].to_string()))
}

/// Keys of a map or instance, sorted; keys of an ordered `Map` in insertion
/// order.
pub(super) fn keys(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    expect_args("keys", &args, 1)?;
    let sorted = |names: Vec<String>| {
        let mut names = names;
        names.sort();
        Value::array(names.into_iter().map(Value::from).collect())
    };
    match &args[0] {
        Value::Map(fields) => Ok(sorted(fields.read().keys().cloned().collect())),
        Value::Instance(inst) => Ok(sorted(inst.props.read().keys().cloned().collect())),
        Value::OrderedMap(map) => Ok(Value::array(
            map.read().entries().iter().map(|(k, _)| k.clone()).collect(),
        )),
        other => Err(type_mismatch("MAP", other.type_name()).into()),
    }
}

/// `Error(message)` and friends. The constructor's name is the first bound
/// argument; the stack is the caller's call stack.
pub(super) fn error(_: &Interpreter, args: Vec<Value>) -> EvalResult {
    let name = arg(&args, 0);
    let message = match args.get(1) {
        None | Some(Value::Null) => String::new(),
        Some(message) => message.to_string(),
    };
    Ok(error_object(
        name.as_str().unwrap_or("Error"),
        &message,
        &CallStack::capture().to_string(),
    ))
}
