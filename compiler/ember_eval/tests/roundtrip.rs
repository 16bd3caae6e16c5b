#![allow(clippy::unwrap_used)]

//! `inspect()` output of plain data re-parses and evaluates to a
//! structurally equal value.

use ember_eval::{EvalMode, Interpreter, Value};
use proptest::prelude::*;
use rustc_hash::FxHashMap;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::Number(f64::from(n))),
        (-1.0e9..1.0e9f64).prop_map(Value::Number),
        "[ -~\n\t\u{e9}\u{1}]{0,8}".prop_map(Value::from),
    ]
}

fn data() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::array),
            prop::collection::vec(("[a-z \"]{0,5}", inner), 0..4).prop_map(|entries| {
                Value::map(entries.into_iter().collect::<FxHashMap<String, Value>>())
            }),
        ]
    })
}

proptest! {
    #[test]
    fn inspect_round_trips(value in data()) {
        let source = format!("({})", value.inspect());
        let program = ember_parse::parse(&source).unwrap();
        let interp = Interpreter::builder().mode(EvalMode::TestRun).build();
        let back = interp.run(&program).unwrap();
        prop_assert!(back.structural_eq(&value), "{source} evaluated to {}", back.inspect());
    }
}
