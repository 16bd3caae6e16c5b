//! Statement nodes and binding patterns.

use std::sync::Arc;

use super::{ClassDecl, Expr, FunctionDecl, Name};
use crate::Span;

/// Statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Binding target of `let`/`const`, loop variables and destructuring.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    Ident(Name),
    /// `[a, , b, ...rest]`; `None` is a hole.
    Array {
        elements: Vec<Option<Pattern>>,
        rest: Option<Name>,
    },
    /// `{ a, b: alias }`
    Object(Vec<(Name, Pattern)>),
}

impl Pattern {
    /// Every name this pattern binds, in source order.
    pub fn bound_names(&self) -> Vec<Name> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut Vec<Name>) {
        match self {
            Pattern::Ident(name) => out.push(name.clone()),
            Pattern::Array { elements, rest } => {
                for p in elements.iter().flatten() {
                    p.collect_names(out);
                }
                out.extend(rest.iter().cloned());
            }
            Pattern::Object(props) => {
                for (_, p) in props {
                    p.collect_names(out);
                }
            }
        }
    }
}

/// Statement kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `let pattern = value` / `const pattern = value`
    Let {
        pattern: Pattern,
        value: Option<Expr>,
        constant: bool,
    },
    Expr(Expr),
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    /// C-style `for (init; cond; update)`
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `for (let k in obj)`: keys of maps, indices of arrays.
    ForIn {
        pattern: Pattern,
        iterable: Expr,
        body: Box<Stmt>,
    },
    /// `for (let v of xs)`: elements.
    ForOf {
        pattern: Pattern,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    Throw(Expr),
    Try {
        block: Vec<Stmt>,
        catch: Option<(Option<Pattern>, Vec<Stmt>)>,
        finally: Option<Vec<Stmt>>,
    },
    Function(Arc<FunctionDecl>),
    Class(Arc<ClassDecl>),
}

/// Parsed source file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}
