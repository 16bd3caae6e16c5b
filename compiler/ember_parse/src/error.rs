//! Parse error types.
//!
//! `ParseError` carries the offending span and, for syntax errors, an
//! `ErrorContext` naming the construct being parsed so messages read
//! "expected `)`, found `;` while parsing a function call".

use ember_ir::Span;
use ember_lexer::LexError;
use thiserror::Error;

/// What the parser was working on when it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    Statement,
    Expression,
    Block,
    FunctionDef,
    FunctionParams,
    ClassDef,
    Pattern,
    ForLoop,
    TryStatement,
    FunctionCall,
    ArrayLiteral,
    MapLiteral,
    FieldAccess,
}

impl ErrorContext {
    /// Phrase suitable for "while parsing {description}".
    pub fn description(self) -> &'static str {
        match self {
            Self::Statement => "a statement",
            Self::Expression => "an expression",
            Self::Block => "a block",
            Self::FunctionDef => "a function definition",
            Self::FunctionParams => "function parameters",
            Self::ClassDef => "a class definition",
            Self::Pattern => "a binding pattern",
            Self::ForLoop => "a for loop",
            Self::TryStatement => "a try statement",
            Self::FunctionCall => "a function call",
            Self::ArrayLiteral => "an array literal",
            Self::MapLiteral => "a map literal",
            Self::FieldAccess => "a field access",
        }
    }
}

fn while_parsing(context: &Option<ErrorContext>) -> String {
    context
        .map(|c| format!(" while parsing {}", c.description()))
        .unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("{}", .0.message)]
    Lex(LexError),

    #[error("expected {expected}, found {found}{}", while_parsing(.context))]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
        context: Option<ErrorContext>,
    },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget { span: Span },

    #[error("`const` declaration requires an initializer")]
    MissingConstInitializer { span: Span },

    #[error("rest element must be last{}", while_parsing(.context))]
    RestNotLast {
        span: Span,
        context: Option<ErrorContext>,
    },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span,
            ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidAssignmentTarget { span }
            | ParseError::MissingConstInitializer { span }
            | ParseError::RestNotLast { span, .. } => *span,
        }
    }

    /// Attach `context` unless a more specific one is already set.
    #[must_use]
    pub fn in_context(mut self, ctx: ErrorContext) -> Self {
        if let ParseError::UnexpectedToken { context, .. }
        | ParseError::RestNotLast { context, .. } = &mut self
        {
            context.get_or_insert(ctx);
        }
        self
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}
