//! Expression nodes.

use std::sync::Arc;

use super::{BinaryOp, FunctionDecl, Name, UnaryOp};
use crate::Span;

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Whether this expression can appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
        )
    }
}

/// Array literal element or call argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Single(Expr),
    /// `...expr`
    Spread(Expr),
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Number(f64),
    Str(Name),
    Bool(bool),
    Null,
    Ident(Name),
    This,

    /// `[a, ...b]`
    Array(Vec<Element>),
    /// `{ key: value }`; keys are kept in source order.
    Map(Vec<(Name, Expr)>),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `cond ? then : otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `target = value`, or `target op= value` when `op` is set.
    Assign {
        target: Box<Expr>,
        op: Option<BinaryOp>,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        args: Vec<Element>,
    },
    /// `object.property`
    Member {
        object: Box<Expr>,
        property: Name,
    },
    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },

    /// Function literal; also produced for `fn name() {}` in expression position.
    Function(Arc<FunctionDecl>),
    /// `new Callee(args)`
    New {
        callee: Box<Expr>,
        args: Vec<Element>,
    },
    Await(Box<Expr>),
}
