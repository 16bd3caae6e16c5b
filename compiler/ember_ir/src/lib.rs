//! Ember IR - syntax tree types.
//!
//! This crate holds the immutable tree the parser produces and the evaluator
//! walks:
//! - Spans for source locations
//! - Operators with their source symbols and precedence
//! - Expressions, statements, patterns, function and class declarations
//!
//! Nothing here evaluates or mutates. Function and class declarations sit
//! behind `Arc` so runtime values can hold on to them without copying the
//! tree.

pub mod ast;
mod span;

pub use ast::{
    BinaryOp, ClassDecl, ClassMember, Element, Expr, ExprKind, FunctionDecl, MemberKind, Name,
    Param, Pattern, Program, Stmt, StmtKind, UnaryOp,
};
pub use span::Span;
