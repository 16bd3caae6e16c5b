#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::errors::{EvalErrorKind, Signal};

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn kind(result: EvalResult) -> EvalErrorKind {
    match result {
        Err(Signal::Error(err)) => err.kind,
        other => panic!("expected an engine error, got {other:?}"),
    }
}

#[test]
fn arithmetic() {
    assert_eq!(evaluate_binary(num(2.0), num(3.0), BinaryOp::Add).unwrap(), num(5.0));
    assert_eq!(evaluate_binary(num(2.0), num(3.0), BinaryOp::Sub).unwrap(), num(-1.0));
    assert_eq!(evaluate_binary(num(2.0), num(3.0), BinaryOp::Mul).unwrap(), num(6.0));
    assert_eq!(evaluate_binary(num(7.0), num(2.0), BinaryOp::Div).unwrap(), num(3.5));
    assert_eq!(evaluate_binary(num(-7.0), num(3.0), BinaryOp::Mod).unwrap(), num(-1.0));
}

#[test]
fn division_and_modulo_by_zero_are_errors() {
    assert_eq!(
        kind(evaluate_binary(num(1.0), num(0.0), BinaryOp::Div)),
        EvalErrorKind::DivisionByZero
    );
    assert_eq!(
        kind(evaluate_binary(num(1.0), num(-0.0), BinaryOp::Mod)),
        EvalErrorKind::DivisionByZero
    );
}

#[test]
fn string_concatenation_coerces_other_side() {
    let v = evaluate_binary(Value::from("Value: "), num(42.0), BinaryOp::Add).unwrap();
    assert_eq!(v, Value::from("Value: 42"));
    let v = evaluate_binary(Value::Bool(true), Value::from("!"), BinaryOp::Add).unwrap();
    assert_eq!(v, Value::from("true!"));
    let v = evaluate_binary(Value::from("n="), Value::Null, BinaryOp::Add).unwrap();
    assert_eq!(v, Value::from("n=null"));
}

#[test]
fn array_concatenation_makes_new_array() {
    let a = Value::array(vec![num(1.0)]);
    let b = Value::array(vec![num(2.0)]);
    let c = evaluate_binary(a.clone(), b, BinaryOp::Add).unwrap();
    assert!(c.structural_eq(&Value::array(vec![num(1.0), num(2.0)])));
    assert_ne!(c, a);
}

#[test]
fn string_ordering_is_lexicographic() {
    let v = evaluate_binary(Value::from("apple"), Value::from("banana"), BinaryOp::Lt).unwrap();
    assert_eq!(v, Value::Bool(true));
}

#[test]
fn mismatched_operands_name_both_kinds() {
    let err = kind(evaluate_binary(num(1.0), Value::Null, BinaryOp::Mul));
    assert_eq!(
        err,
        EvalErrorKind::BinaryTypeMismatch {
            op: BinaryOp::Mul,
            left: "NUMBER".to_owned(),
            right: "NULL".to_owned(),
        }
    );
    assert!(err.to_string().contains("NUMBER"));
    assert!(matches!(
        kind(evaluate_binary(Value::from("a"), Value::from("b"), BinaryOp::Sub)),
        EvalErrorKind::BinaryTypeMismatch { .. }
    ));
}

#[test]
fn equality_is_identity_for_references() {
    let a = Value::array(vec![]);
    let b = Value::array(vec![]);
    assert_eq!(evaluate_binary(a.clone(), a.clone(), BinaryOp::Eq).unwrap(), Value::Bool(true));
    assert_eq!(evaluate_binary(a, b, BinaryOp::Eq).unwrap(), Value::Bool(false));
    assert_eq!(
        evaluate_binary(num(1.0), Value::from("1"), BinaryOp::NotEq).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn logical_operators_pick_deciding_operand() {
    assert_eq!(evaluate_binary(num(0.0), num(5.0), BinaryOp::Or).unwrap(), num(5.0));
    assert_eq!(evaluate_binary(num(0.0), num(5.0), BinaryOp::And).unwrap(), num(0.0));
}

proptest! {
    #[test]
    fn arithmetic_matches_ieee(a in any::<f64>(), b in any::<f64>()) {
        let sum = evaluate_binary(num(a), num(b), BinaryOp::Add).unwrap();
        prop_assert!(sum.structural_eq(&num(a + b)));
        let product = evaluate_binary(num(a), num(b), BinaryOp::Mul).unwrap();
        prop_assert!(product.structural_eq(&num(a * b)));
        let lt = evaluate_binary(num(a), num(b), BinaryOp::Lt).unwrap();
        prop_assert_eq!(lt, Value::Bool(a < b));
    }

    #[test]
    fn division_matches_ieee_or_errors_on_zero(a in any::<f64>(), b in any::<f64>()) {
        let result = evaluate_binary(num(a), num(b), BinaryOp::Div);
        if b == 0.0 {
            prop_assert!(matches!(result, Err(Signal::Error(_))));
        } else {
            prop_assert!(result.unwrap().structural_eq(&num(a / b)));
        }
    }
}
