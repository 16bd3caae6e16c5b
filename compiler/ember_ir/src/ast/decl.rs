//! Function and class declarations.

use std::sync::Arc;

use super::{Expr, Name, Stmt};
use crate::Span;

/// Function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub default: Option<Expr>,
    /// `...name` collects the remaining arguments.
    pub rest: bool,
}

/// Function declaration or literal.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Option<Name>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub span: Span,
}

impl FunctionDecl {
    /// Parameters that must be supplied by the caller.
    pub fn required_params(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.rest && p.default.is_none())
            .count()
    }

    /// Name for diagnostics; anonymous functions report `<anonymous>`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

/// Class member kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberKind {
    Method(Arc<FunctionDecl>),
    Getter(Arc<FunctionDecl>),
    Setter(Arc<FunctionDecl>),
    /// `name = init` field; instance fields run per `new`, static fields once.
    Field(Option<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassMember {
    pub name: Name,
    pub kind: MemberKind,
    pub is_static: bool,
    pub span: Span,
}

/// Class declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub name: Name,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassDecl {
    /// The `constructor` method, if declared.
    pub fn constructor(&self) -> Option<&Arc<FunctionDecl>> {
        self.members.iter().find_map(|m| match &m.kind {
            MemberKind::Method(decl) if !m.is_static && &*m.name == "constructor" => Some(decl),
            _ => None,
        })
    }
}
