//! Functions, closures and classes.

use pretty_assertions::assert_eq;

use super::{eval, eval_err, eval_inspect};
use crate::{EvalErrorKind, Value};

#[test]
fn closures_keep_their_own_counter() {
    let src = "fn makeCounter() {\n\
                 let count = 0\n\
                 return fn() { count++\n return count }\n\
               }\n\
               let a = makeCounter()\n\
               let b = makeCounter()\n\
               a()\na()\nb()\n\
               a() * 10 + b()";
    assert_eq!(eval(src), Value::Number(32.0));
}

#[test]
fn closures_from_one_scope_share_it() {
    let src = "fn pair() {\n\
                 let n = 0\n\
                 return [fn() { n += 1 }, fn() { return n }]\n\
               }\n\
               let [inc, get] = pair()\n\
               inc()\ninc()\n\
               get()";
    assert_eq!(eval(src), Value::Number(2.0));
}

#[test]
fn loop_closures_capture_per_iteration_bindings() {
    let src = "let fs = []\n\
               for (let x of [1, 2, 3]) { fs.push(fn() { return x }) }\n\
               fs[0]() + fs[2]()";
    assert_eq!(eval(src), Value::Number(4.0));
}

#[test]
fn recursion_through_the_closure_chain() {
    let src = "fn fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2) }\nfib(15)";
    assert_eq!(eval(src), Value::Number(610.0));
}

#[test]
fn named_function_literal_sees_itself() {
    let src = "let fact = fn inner(n) { return n <= 1 ? 1 : n * inner(n - 1) }\nfact(5)";
    assert_eq!(eval(src), Value::Number(120.0));
}

#[test]
fn function_declarations_are_hoisted() {
    assert_eq!(eval("let r = later()\nfn later() { return 7 }\nr"), Value::Number(7.0));
}

#[test]
fn default_parameters_see_earlier_ones() {
    let src = "fn area(w, h = w) { return w * h }\n[area(3), area(3, 4)]";
    assert_eq!(eval_inspect(src), "[9, 12]");
}

#[test]
fn missing_required_argument_is_an_arity_error() {
    let err = eval_err("fn f(a, b) { return a }\nf(1)");
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "f".to_owned(),
            expected: 2,
            got: 1
        }
    );
}

#[test]
fn extra_arguments_are_ignored() {
    assert_eq!(eval("fn f(a) { return a }\nf(1, 2, 3)"), Value::Number(1.0));
}

#[test]
fn rest_parameter_is_always_an_array() {
    let src = "fn f(first, ...rest) { return rest }\n[typeof(f(1)), len(f(1)), len(f(1, 2, 3))]";
    assert_eq!(eval_inspect(src), r#"["ARRAY", 0, 2]"#);
}

#[test]
fn spread_arguments() {
    let src = "fn add(a, b, c) { return a + b + c }\nlet xs = [2, 3]\nadd(1, ...xs)";
    assert_eq!(eval(src), Value::Number(6.0));
}

#[test]
fn spreading_a_string_is_a_type_error() {
    let err = eval_err("fn f(a) { return a }\nf(...\"ab\")");
    assert_eq!(
        err.kind,
        EvalErrorKind::InvalidSpread {
            got: "STRING".to_owned()
        }
    );
    assert!(err.kind.is_type_mismatch());
}

#[test]
fn calling_a_non_callable() {
    let err = eval_err("let x = 3\nx()");
    assert_eq!(
        err.kind,
        EvalErrorKind::NotCallable {
            type_name: "NUMBER".to_owned()
        }
    );
}

#[test]
fn function_without_return_yields_null() {
    assert_eq!(eval("fn f() { 1 + 1 }\nf()"), Value::Null);
}

const COUNTER: &str = "class Counter {\n\
                         static created = 0\n\
                         count = 0\n\
                         constructor(start) {\n\
                           this.count = start\n\
                           Counter.created += 1\n\
                         }\n\
                         get doubled() { return this.count * 2 }\n\
                         set doubled(v) { this.count = v / 2 }\n\
                         inc() { this.count++\n return this }\n\
                         static describe() { return \"counter \" + this.created }\n\
                       }\n";

#[test]
fn class_construction_methods_and_accessors() {
    let src = format!(
        "{COUNTER}\
         let c = new Counter(5)\n\
         c.inc().inc()\n\
         c.doubled = 20;\n\
         [c.count, c.doubled, Counter.created]"
    );
    assert_eq!(eval_inspect(&src), "[10, 20, 1]");
}

#[test]
fn static_members_belong_to_the_class() {
    let src = format!("{COUNTER}new Counter(1)\nnew Counter(2)\nCounter.describe()");
    assert_eq!(eval(&src), Value::from("counter 2"));
}

#[test]
fn field_initialisers_run_before_the_constructor() {
    let src = "class Box {\n\
                 items = []\n\
                 constructor() { this.items.push(\"ready\") }\n\
               }\n\
               let a = new Box()\n\
               let b = new Box()\n\
               a.items.push(\"more\");\n\
               [len(a.items), len(b.items)]";
    assert_eq!(eval_inspect(src), "[2, 1]");
}

#[test]
fn methods_taken_off_an_instance_stay_bound() {
    let src = format!("{COUNTER}let c = new Counter(1)\nlet inc = c.inc\ninc()\nc.count");
    assert_eq!(eval(&src), Value::Number(2.0));
}

#[test]
fn calling_a_class_without_new_instantiates_it() {
    let src = format!("{COUNTER}let c = Counter(4)\nc.count");
    assert_eq!(eval(&src), Value::Number(4.0));
}

#[test]
fn unknown_method_on_instance() {
    let src = format!("{COUNTER}let c = new Counter(1)\nc.reset()");
    assert!(matches!(
        eval_err(&src).kind,
        EvalErrorKind::UndefinedProperty { .. }
    ));
}

#[test]
fn instance_properties_are_shared_by_reference() {
    let src = format!(
        "{COUNTER}let c = new Counter(1)\n\
         fn bump(counter) {{ counter.count = 100 }}\n\
         bump(c)\n\
         c.count"
    );
    assert_eq!(eval(&src), Value::Number(100.0));
}

#[test]
fn instances_display_with_class_name() {
    let src = "class Point { constructor(x) { this.x = x } }\nstr(new Point(1))";
    assert_eq!(eval(src), Value::from(r#"Point {"x": 1}"#));
}
