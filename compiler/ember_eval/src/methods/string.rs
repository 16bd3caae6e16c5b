//! String methods. Strings are immutable; every method returns a new value.

use super::{arg, expect_str, MethodFn};
use crate::errors::EvalResult;
use crate::interpreter::Interpreter;
use crate::value::Value;

pub(super) fn lookup(name: &str) -> Option<MethodFn> {
    let method: MethodFn = match name {
        "toUpperCase" => to_upper_case,
        "toLowerCase" => to_lower_case,
        "split" => split,
        "includes" => includes,
        "trim" => trim,
        _ => return None,
    };
    Some(method)
}

fn text(receiver: &Value) -> &str {
    receiver.as_str().unwrap_or_default()
}

fn to_upper_case(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    Ok(Value::string(text(receiver).to_uppercase()))
}

fn to_lower_case(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    Ok(Value::string(text(receiver).to_lowercase()))
}

/// `split(sep)`: an empty separator splits into characters; no separator
/// yields the whole string as the only element.
fn split(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let s = text(receiver);
    let parts: Vec<Value> = match args.first() {
        None | Some(Value::Null) => vec![Value::from(s)],
        Some(sep) => {
            let sep = expect_str(sep)?;
            if sep.is_empty() {
                s.chars().map(|c| Value::string(c.to_string())).collect()
            } else {
                s.split(sep).map(Value::from).collect()
            }
        }
    };
    Ok(Value::array(parts))
}

fn includes(_: &Interpreter, receiver: &Value, args: Vec<Value>) -> EvalResult {
    let needle = arg(&args, 0);
    let needle = expect_str(&needle)?;
    Ok(Value::Bool(memchr::memmem::find(text(receiver).as_bytes(), needle.as_bytes()).is_some()))
}

fn trim(_: &Interpreter, receiver: &Value, _: Vec<Value>) -> EvalResult {
    Ok(Value::from(text(receiver).trim()))
}
