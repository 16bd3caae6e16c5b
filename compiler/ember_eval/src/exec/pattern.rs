//! Destructuring. Missing elements and properties bind `null`.

use ember_ir::{Name, Pattern};

use crate::environment::Environment;
use crate::errors::{type_mismatch, Signal};
use crate::interpreter::Interpreter;
use crate::methods;
use crate::value::Value;

impl Interpreter {
    pub(crate) fn bind_pattern(
        &self,
        pattern: &Pattern,
        value: Value,
        env: &Environment,
        constant: bool,
    ) -> Result<(), Signal> {
        match pattern {
            Pattern::Ident(name) => {
                if constant {
                    env.set_constant(Name::clone(name), value)?;
                } else {
                    env.set(Name::clone(name), value)?;
                }
                Ok(())
            }
            Pattern::Array { elements, rest } => {
                let items = match &value {
                    Value::Array(items) => items.snapshot(),
                    Value::Str(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
                    Value::Null => Vec::new(),
                    other => return Err(type_mismatch("ARRAY", other.type_name()).into()),
                };
                for (i, element) in elements.iter().enumerate() {
                    if let Some(element) = element {
                        let item = items.get(i).cloned().unwrap_or(Value::Null);
                        self.bind_pattern(element, item, env, constant)?;
                    }
                }
                if let Some(rest) = rest {
                    let remaining = items.get(elements.len()..).unwrap_or_default().to_vec();
                    self.bind_pattern(
                        &Pattern::Ident(Name::clone(rest)),
                        Value::array(remaining),
                        env,
                        constant,
                    )?;
                }
                Ok(())
            }
            Pattern::Object(props) => {
                for (key, target) in props {
                    let item = self.pattern_property(&value, key)?;
                    self.bind_pattern(target, item, env, constant)?;
                }
                Ok(())
            }
        }
    }

    fn pattern_property(&self, value: &Value, key: &str) -> Result<Value, Signal> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Map(_) | Value::Instance(_) | Value::Class(_) | Value::Builtin(_) => {
                self.get_member(value, key)
            }
            other => Ok(methods::get_property(other, key).unwrap_or(Value::Null)),
        }
    }
}
