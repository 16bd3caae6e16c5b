//! Property, index and method access.
//!
//! Lookup order on instances: own properties, then getters, then methods
//! (returned bound to the instance). Maps are plain string-keyed records;
//! a missing key reads as `null`. Native values (arrays, strings,
//! collections, promises, ...) resolve through `crate::methods`.

use ember_ir::{Name, Span};

use crate::errors::{index_out_of_bounds, undefined_property, EvalResult, Signal};
use crate::interpreter::Interpreter;
use crate::methods;
use crate::value::Value;

/// Position addressed by a numeric index, if it is a whole number within
/// `0..len`.
pub(crate) fn index_slot(index: f64, len: usize) -> Option<usize> {
    if index >= 0.0 && index.fract() == 0.0 && index < len as f64 {
        Some(index as usize)
    } else {
        None
    }
}

impl Interpreter {
    /// `object.name`
    pub(crate) fn get_member(&self, object: &Value, name: &str) -> EvalResult {
        match object {
            Value::Instance(inst) => {
                let own = inst.props.read().get(name).cloned();
                if let Some(value) = own {
                    return Ok(value);
                }
                let class = &inst.class;
                if let Some(getter) = class.getters.get(name) {
                    let this = Some(object.clone());
                    return self.call_function(getter, &class.env, Vec::new(), this, None);
                }
                Ok(class.bound_method(name, object.clone()).unwrap_or(Value::Null))
            }
            Value::Class(class) => {
                if let Some(getter) = class.static_getters.get(name) {
                    let this = Some(object.clone());
                    return self.call_function(getter, &class.env, Vec::new(), this, None);
                }
                Ok(class.static_member(name).unwrap_or(Value::Null))
            }
            Value::Map(fields) => Ok(fields.read().get(name).cloned().unwrap_or(Value::Null)),
            Value::Builtin(builtin) => {
                Ok(builtin.statics.get(name).cloned().unwrap_or(Value::Null))
            }
            other => methods::get_property(other, name)
                .ok_or_else(|| undefined_property(name, other.type_name()).into()),
        }
    }

    /// `object.name = value`
    pub(crate) fn set_member(
        &self,
        object: &Value,
        name: &str,
        value: Value,
    ) -> Result<(), Signal> {
        match object {
            Value::Instance(inst) => {
                if let Some(setter) = inst.class.setters.get(name) {
                    let this = Some(object.clone());
                    self.call_function(setter, &inst.class.env, vec![value], this, None)?;
                    return Ok(());
                }
                inst.props.write().insert(name.to_owned(), value);
                Ok(())
            }
            Value::Class(class) => {
                if let Some(setter) = class.static_setters.get(name) {
                    let this = Some(object.clone());
                    self.call_function(setter, &class.env, vec![value], this, None)?;
                    return Ok(());
                }
                class.statics.write().insert(Name::from(name), value);
                Ok(())
            }
            Value::Map(fields) => {
                fields.write().insert(name.to_owned(), value);
                Ok(())
            }
            other => Err(undefined_property(name, other.type_name()).into()),
        }
    }

    /// `object[index]`
    pub(crate) fn get_index(&self, object: &Value, index: &Value) -> EvalResult {
        match (object, index) {
            (Value::Array(items), Value::Number(n)) => {
                let items = items.read();
                index_slot(*n, items.len())
                    .map(|i| items[i].clone())
                    .ok_or_else(|| index_out_of_bounds(*n, items.len()).into())
            }
            (Value::Str(s), Value::Number(n)) => {
                let len = s.chars().count();
                index_slot(*n, len)
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::string(c.to_string()))
                    .ok_or_else(|| index_out_of_bounds(*n, len).into())
            }
            // Numeric keys use their display form.
            (Value::Map(fields), Value::Str(_) | Value::Number(_)) => Ok(fields
                .read()
                .get(&index.to_string())
                .cloned()
                .unwrap_or(Value::Null)),
            (_, Value::Str(key)) => self.get_member(object, key),
            (other, index) => Err(undefined_property(&index.to_string(), other.type_name()).into()),
        }
    }

    /// `object[index] = value`. Assigning one past the end of an array
    /// appends.
    pub(crate) fn set_index(
        &self,
        object: &Value,
        index: &Value,
        value: Value,
    ) -> Result<(), Signal> {
        match (object, index) {
            (Value::Array(items), Value::Number(n)) => {
                let mut items = items.write();
                let len = items.len();
                if let Some(i) = index_slot(*n, len) {
                    items[i] = value;
                    Ok(())
                } else if *n == len as f64 {
                    items.push(value);
                    Ok(())
                } else {
                    Err(index_out_of_bounds(*n, len).into())
                }
            }
            (Value::Map(fields), Value::Str(_) | Value::Number(_)) => {
                fields.write().insert(index.to_string(), value);
                Ok(())
            }
            (_, Value::Str(key)) => self.set_member(object, key, value),
            (other, index) => Err(undefined_property(&index.to_string(), other.type_name()).into()),
        }
    }

    /// `receiver.name(args)`: the receiver becomes `this`.
    pub(crate) fn call_method(
        &self,
        receiver: &Value,
        name: &str,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult {
        let callee = match receiver {
            Value::Instance(inst) => {
                let own = inst.props.read().get(name).cloned();
                match own {
                    Some(value) => value,
                    None => match self.get_member(receiver, name)? {
                        Value::Null => {
                            return Err(undefined_property(name, &inst.class_name).into())
                        }
                        value => value,
                    },
                }
            }
            Value::Class(class) => match self.get_member(receiver, name)? {
                Value::Null => return Err(undefined_property(name, &class.name).into()),
                value => value,
            },
            Value::Map(fields) => {
                let field = fields.read().get(name).cloned();
                match field {
                    Some(value) => value,
                    None => return Err(undefined_property(name, receiver.type_name()).into()),
                }
            }
            Value::Builtin(builtin) => match builtin.statics.get(name) {
                Some(value) => value.clone(),
                None => return Err(undefined_property(name, &builtin.name).into()),
            },
            other => return methods::call_method(self, other, name, args),
        };
        self.call_value(&callee, args, Some(receiver.clone()), Some(span))
    }
}
