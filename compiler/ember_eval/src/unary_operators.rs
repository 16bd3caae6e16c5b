//! Unary operators.

use ember_ir::UnaryOp;

use crate::errors::{unary_type_mismatch, EvalResult};
use crate::value::Value;

/// `-` negates numbers only; `!` / `not` works on any value's truthiness.
#[allow(clippy::needless_pass_by_value)]
pub fn evaluate_unary(value: Value, op: UnaryOp) -> EvalResult {
    match (&value, op) {
        (Value::Number(n), UnaryOp::Neg) => Ok(Value::Number(-n)),
        (_, UnaryOp::Not) => Ok(Value::Bool(!value.is_truthy())),
        _ => Err(unary_type_mismatch(op, value.type_name()).into()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::{EvalErrorKind, Signal};

    #[test]
    fn negation() {
        assert_eq!(
            evaluate_unary(Value::Number(2.5), UnaryOp::Neg).unwrap(),
            Value::Number(-2.5)
        );
    }

    #[test]
    fn not_uses_truthiness() {
        for (value, expected) in [
            (Value::Number(0.0), true),
            (Value::from(""), true),
            (Value::Null, true),
            (Value::Bool(false), true),
            (Value::Number(f64::NAN), false),
            (Value::array(vec![]), false),
            (Value::from("x"), false),
        ] {
            assert_eq!(
                evaluate_unary(value, UnaryOp::Not).unwrap(),
                Value::Bool(expected)
            );
        }
    }

    #[test]
    fn negating_a_string_is_a_type_error() {
        let err = evaluate_unary(Value::from("x"), UnaryOp::Neg).unwrap_err();
        let Signal::Error(err) = err else {
            panic!("expected engine error");
        };
        assert_eq!(
            err.kind,
            EvalErrorKind::UnaryTypeMismatch {
                op: UnaryOp::Neg,
                operand: "STRING".to_owned(),
            }
        );
    }
}
