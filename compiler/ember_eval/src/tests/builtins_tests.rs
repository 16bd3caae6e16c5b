//! Global builtins.

use pretty_assertions::assert_eq;

use super::{eval, eval_err, eval_inspect, output};
use crate::{EvalErrorKind, Value};

#[test]
fn print_joins_display_forms() {
    assert_eq!(
        output("print(\"a\", 1, [\"b\"], null)\nprint()"),
        "a 1 [\"b\"] null\n\n"
    );
}

#[test]
fn len_of_each_aggregate() {
    let src = "[len(\"héllo\"), len([1, 2]), len({ a: 1 }), len(new Map([[1, 2]])), len(new Set())]";
    assert_eq!(eval_inspect(src), "[5, 2, 1, 1, 0]");
    assert!(eval_err("len(3)").kind.is_type_mismatch());
}

#[test]
fn len_requires_an_argument() {
    assert_eq!(
        eval_err("len()").kind,
        EvalErrorKind::ArityMismatch {
            name: "len".to_owned(),
            expected: 1,
            got: 0
        }
    );
}

#[test]
fn typeof_names() {
    let src = "[typeof(1), typeof(\"s\"), typeof(null), typeof({}), typeof(new Map()), typeof(print), typeof(fn() {})]";
    assert_eq!(
        eval_inspect(src),
        r#"["NUMBER", "STRING", "NULL", "MAP", "ES6MAP", "BUILTIN", "FUNCTION"]"#
    );
}

#[test]
fn str_uses_display_form() {
    assert_eq!(eval("str(1.5) + str(true)"), Value::from("1.5true"));
    assert_eq!(eval("str(\"x\")"), Value::from("x"));
}

#[test]
fn keys_sorted_for_maps_and_instances() {
    let src = "class P { constructor() { this.b = 1\n this.a = 2 } }\n\
               [keys({ z: 1, y: 2 }), keys(new P()), keys(new Map([[\"q\", 1], [\"p\", 2]]))]";
    assert_eq!(
        eval_inspect(src),
        r#"[["y", "z"], ["a", "b"], ["q", "p"]]"#
    );
}

#[test]
fn error_without_message() {
    assert_eq!(eval("TypeError().message"), Value::from(""));
}

#[test]
fn sleep_blocks_then_returns_null() {
    assert_eq!(eval("sleep(1)"), Value::Null);
    assert!(eval_err("sleep(\"soon\")").kind.is_type_mismatch());
}

#[test]
fn sleep_rejects_a_delay_too_long_to_represent() {
    let err = eval_err("sleep(1e300)");
    assert!(err.to_string().contains("out of range"), "{err}");
    assert_eq!(eval("sleep(-5)"), Value::Null);
    assert_eq!(eval("sleep(0)"), Value::Null);
}

#[test]
fn builtins_can_be_shadowed_locally() {
    assert_eq!(eval("fn f() { let print = 5\n return print }\nf()"), Value::Number(5.0));
}
