//! Syntax tree nodes.
//!
//! Expressions and statements are plain owned trees (`Box`/`Vec`). Function
//! and class declarations are wrapped in `Arc` because closures and classes
//! keep them alive at runtime.

mod decl;
mod expr;
mod operators;
mod stmt;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use decl::{ClassDecl, ClassMember, FunctionDecl, MemberKind, Param};
pub use expr::{Element, Expr, ExprKind};
pub use operators::{BinaryOp, UnaryOp};
pub use stmt::{Pattern, Program, Stmt, StmtKind};

/// Identifier or property name.
pub type Name = Arc<str>;
