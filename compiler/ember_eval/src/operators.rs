//! Binary operators.
//!
//! Direct dispatch on operand variants. `&&` and `||` short-circuit in the
//! evaluator; here they only pick the deciding operand, for callers that
//! already hold both values.

use ember_ir::BinaryOp;

use crate::errors::{binary_type_mismatch, division_by_zero, EvalResult};
use crate::value::Value;

/// Apply `op` to two evaluated operands.
#[allow(clippy::needless_pass_by_value)]
pub fn evaluate_binary(left: Value, right: Value, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => return Ok(Value::Bool(left != right)),
        BinaryOp::And => return Ok(if left.is_truthy() { right } else { left }),
        BinaryOp::Or => return Ok(if left.is_truthy() { left } else { right }),
        _ => {}
    }
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => eval_number_binary(*a, *b, op),
        (Value::Str(a), Value::Str(b)) if op != BinaryOp::Add => eval_string_compare(a, b, op)
            .ok_or_else(|| binary_type_mismatch(op, left.type_name(), right.type_name()).into()),
        (Value::Str(_), _) | (_, Value::Str(_)) if op == BinaryOp::Add => {
            Ok(Value::string(format!("{left}{right}")))
        }
        (Value::Array(a), Value::Array(b)) if op == BinaryOp::Add => {
            let mut items = a.snapshot();
            items.extend(b.snapshot());
            Ok(Value::array(items))
        }
        _ => Err(binary_type_mismatch(op, left.type_name(), right.type_name()).into()),
    }
}

fn eval_number_binary(a: f64, b: f64, op: BinaryOp) -> EvalResult {
    let value = match op {
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => return Err(division_by_zero().into()),
        BinaryOp::Div => Value::Number(a / b),
        BinaryOp::Mod => Value::Number(a % b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            unreachable!("handled before operand dispatch")
        }
    };
    Ok(value)
}

fn eval_string_compare(a: &str, b: &str, op: BinaryOp) -> Option<Value> {
    let result = match op {
        BinaryOp::Lt => a < b,
        BinaryOp::LtEq => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::GtEq => a >= b,
        _ => return None,
    };
    Some(Value::Bool(result))
}

#[cfg(test)]
mod tests;
