use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::Span;

fn ident(name: &str) -> Expr {
    Expr::new(ExprKind::Ident(Arc::from(name)), Span::DUMMY)
}

#[test]
fn precedence_orders_multiplicative_above_logical() {
    assert!(BinaryOp::Mul.binding_power() > BinaryOp::Add.binding_power());
    assert!(BinaryOp::Add.binding_power() > BinaryOp::Lt.binding_power());
    assert!(BinaryOp::Lt.binding_power() > BinaryOp::Eq.binding_power());
    assert!(BinaryOp::Eq.binding_power() > BinaryOp::And.binding_power());
    assert!(BinaryOp::And.binding_power() > BinaryOp::Or.binding_power());
}

#[test]
fn compound_assignment_is_arithmetic_only() {
    assert!(BinaryOp::Mod.is_compound_assignable());
    assert!(!BinaryOp::Eq.is_compound_assignable());
    assert!(!BinaryOp::And.is_compound_assignable());
}

#[test]
fn assignable_targets() {
    assert!(ident("x").is_assignable());
    let member = Expr::new(
        ExprKind::Member {
            object: Box::new(ident("a")),
            property: Arc::from("b"),
        },
        Span::DUMMY,
    );
    assert!(member.is_assignable());
    assert!(!Expr::new(ExprKind::Number(1.0), Span::DUMMY).is_assignable());
}

#[test]
fn pattern_bound_names_in_order() {
    let pattern = Pattern::Array {
        elements: vec![
            Some(Pattern::Ident(Arc::from("a"))),
            None,
            Some(Pattern::Object(vec![(
                Arc::from("k"),
                Pattern::Ident(Arc::from("alias")),
            )])),
        ],
        rest: Some(Arc::from("rest")),
    };
    let names: Vec<String> = pattern.bound_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["a", "alias", "rest"]);
}

#[test]
fn required_params_skip_defaults_and_rest() {
    let param = |name: &str, default: bool, rest: bool| Param {
        name: Arc::from(name),
        default: default.then(|| Expr::new(ExprKind::Null, Span::DUMMY)),
        rest,
    };
    let decl = FunctionDecl {
        name: None,
        params: vec![
            param("a", false, false),
            param("b", true, false),
            param("c", false, true),
        ],
        body: Vec::new(),
        is_async: false,
        span: Span::DUMMY,
    };
    assert_eq!(decl.required_params(), 1);
    assert_eq!(decl.display_name(), "<anonymous>");
}
