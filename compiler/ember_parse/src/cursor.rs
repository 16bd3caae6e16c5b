//! Token cursor for navigating the token stream.

use ember_ir::{Name, Span};
use ember_lexer::{Token, TokenKind};
use tracing::trace;

use crate::error::ParseError;

/// Cursor over a token vector that always ends in `Eof`.
pub(crate) struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
    prev_end: u32,
}

impl Cursor {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Cursor {
            tokens,
            pos: 0,
            prev_end: 0,
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    #[inline]
    pub(crate) fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// Kind of the token `n` places ahead.
    pub(crate) fn peek_kind(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)].kind
    }

    #[inline]
    pub(crate) fn span(&self) -> Span {
        self.current().span
    }

    /// End offset of the last consumed token.
    #[inline]
    #[allow(dead_code)]
    pub(crate) fn prev_end(&self) -> u32 {
        self.prev_end
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    pub(crate) fn newline_before(&self) -> bool {
        self.current().newline_before
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        trace!(kind = ?token.kind, span = ?token.span, "consume");
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
            self.prev_end = token.span.end;
        }
        token
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    /// Plain identifier.
    pub(crate) fn expect_ident(&mut self) -> Result<Name, ParseError> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let name = Name::from(name.as_str());
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Identifier or keyword used as a property or member name.
    pub(crate) fn expect_property_name(&mut self) -> Result<Name, ParseError> {
        let name = match self.kind() {
            TokenKind::Ident(name) => Name::from(name.as_str()),
            kind => match kind.keyword_text() {
                Some(text) => Name::from(text),
                None => return Err(self.unexpected("property name")),
            },
        };
        self.advance();
        Ok(name)
    }

    /// Contextual keyword such as `of`, `get` or `set`.
    pub(crate) fn check_contextual(&self, word: &str) -> bool {
        matches!(self.kind(), TokenKind::Ident(name) if name == word)
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_owned(),
            found: self.kind().to_string(),
            span: self.span(),
            context: None,
        }
    }
}
