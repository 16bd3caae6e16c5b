//! Ember lexer.
//!
//! Turns source text into a flat `Vec<Token>` terminated by
//! [`TokenKind::Eof`]. Whitespace and comments are dropped; each token
//! records whether a line break preceded it so the parser can treat
//! newlines as optional statement terminators.

mod cursor;
mod token;

#[cfg(test)]
mod tests;

use std::fmt;

use ember_ir::Span;

use cursor::Cursor;
pub use token::{Token, TokenKind};

/// Lexical error: bad character, unterminated literal or malformed escape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        LexError {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

impl std::error::Error for LexError {}

/// Tokenize `source`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer {
        cursor: Cursor::new(source),
        tokens: Vec::new(),
        newline_before: false,
    }
    .run()
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
    newline_before: bool,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.skip_trivia()?;
            let start = self.cursor.pos();
            if self.cursor.is_eof() {
                self.push(TokenKind::Eof, start);
                return Ok(self.tokens);
            }
            let kind = self.next_kind(start)?;
            self.push(kind, start);
        }
    }

    fn push(&mut self, kind: TokenKind, start: u32) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, self.cursor.pos()),
            newline_before: self.newline_before,
        });
        self.newline_before = false;
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match (self.cursor.current(), self.cursor.peek()) {
                (b' ' | b'\t' | b'\r', _) => self.cursor.advance(),
                (b'\n', _) => {
                    self.newline_before = true;
                    self.cursor.advance();
                }
                (b'/', b'/') => self.cursor.eat_line(),
                (b'/', b'*') => {
                    let start = self.cursor.pos();
                    self.cursor.advance_n(2);
                    match self.cursor.eat_through(b"*/") {
                        Some(newline) => self.newline_before |= newline,
                        None => {
                            return Err(LexError::new(
                                "unterminated block comment",
                                Span::new(start, self.cursor.pos()),
                            ))
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_kind(&mut self, start: u32) -> Result<TokenKind, LexError> {
        let c = self.cursor.current();
        if c.is_ascii_digit() || (c == b'.' && self.cursor.peek().is_ascii_digit()) {
            return self.number(start);
        }
        if is_ident_start(c) {
            self.cursor.eat_while(is_ident_continue);
            let text = self.cursor.slice_from(start);
            return Ok(TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Ident(text.into())));
        }
        if c == b'"' || c == b'\'' {
            return self.string(c, start);
        }
        self.punct(start)
    }

    fn number(&mut self, start: u32) -> Result<TokenKind, LexError> {
        if self.cursor.current() == b'0' && matches!(self.cursor.peek(), b'x' | b'X') {
            self.cursor.advance_n(2);
            let digits_start = self.cursor.pos();
            self.cursor.eat_while(|b| b.is_ascii_hexdigit());
            let digits = self.cursor.slice_from(digits_start);
            return u64::from_str_radix(digits, 16)
                .map(|n| TokenKind::Number(n as f64))
                .map_err(|_| {
                    LexError::new("malformed hex literal", Span::new(start, self.cursor.pos()))
                });
        }
        self.cursor.eat_while(|b| b.is_ascii_digit());
        if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
        }
        if matches!(self.cursor.current(), b'e' | b'E') {
            let sign = usize::from(matches!(self.cursor.peek(), b'+' | b'-'));
            if self.cursor.peek_n(1 + sign).is_ascii_digit() {
                self.cursor.advance_n(1 + sign as u32);
                self.cursor.eat_while(|b| b.is_ascii_digit());
            }
        }
        let text = self.cursor.slice_from(start);
        text.parse::<f64>().map(TokenKind::Number).map_err(|_| {
            LexError::new(
                format!("malformed number `{text}`"),
                Span::new(start, self.cursor.pos()),
            )
        })
    }

    fn string(&mut self, quote: u8, start: u32) -> Result<TokenKind, LexError> {
        self.cursor.advance();
        let mut out = String::new();
        loop {
            let run_start = self.cursor.pos();
            let delim = self.cursor.skip_to_string_delim(quote);
            out.push_str(self.cursor.slice_from(run_start));
            match delim {
                Some(b'\\') => {
                    self.cursor.advance();
                    self.escape(&mut out)?;
                }
                Some(b) if b == quote => {
                    self.cursor.advance();
                    return Ok(TokenKind::Str(out));
                }
                _ => {
                    return Err(LexError::new(
                        "unterminated string literal",
                        Span::new(start, self.cursor.pos()),
                    ))
                }
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LexError> {
        let at = self.cursor.pos().saturating_sub(1);
        let c = self.cursor.current();
        if self.cursor.is_eof() {
            return Err(LexError::new("unterminated escape", Span::point(at)));
        }
        let simple = match c {
            b'n' => Some('\n'),
            b't' => Some('\t'),
            b'r' => Some('\r'),
            b'0' => Some('\0'),
            b'\\' => Some('\\'),
            b'\'' => Some('\''),
            b'"' => Some('"'),
            b'\n' => None,
            b'u' => {
                self.cursor.advance();
                let ch = self.unicode_escape(at)?;
                out.push(ch);
                return Ok(());
            }
            _ => {
                // Unknown escapes keep the escaped character.
                let ch_start = self.cursor.pos();
                self.cursor.advance_char();
                out.push_str(self.cursor.slice_from(ch_start));
                return Ok(());
            }
        };
        self.cursor.advance();
        if let Some(ch) = simple {
            out.push(ch);
        }
        Ok(())
    }

    /// `\u{1F600}` or `\u00E9`; the cursor sits after the `u`.
    fn unicode_escape(&mut self, at: u32) -> Result<char, LexError> {
        let braced = self.cursor.current() == b'{';
        if braced {
            self.cursor.advance();
        }
        let digits_start = self.cursor.pos();
        if braced {
            self.cursor.eat_while(|b| b.is_ascii_hexdigit());
        } else {
            for _ in 0..4 {
                if !self.cursor.current().is_ascii_hexdigit() {
                    break;
                }
                self.cursor.advance();
            }
        }
        let digits = self.cursor.slice_from(digits_start);
        let bad = |cursor: &Cursor<'_>| {
            LexError::new("malformed unicode escape", Span::new(at, cursor.pos()))
        };
        if braced {
            if self.cursor.current() != b'}' {
                return Err(bad(&self.cursor));
            }
            self.cursor.advance();
        } else if digits.len() != 4 {
            return Err(bad(&self.cursor));
        }
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| bad(&self.cursor))
    }

    fn punct(&mut self, start: u32) -> Result<TokenKind, LexError> {
        use TokenKind as T;
        let (c, n1, n2) = (
            self.cursor.current(),
            self.cursor.peek(),
            self.cursor.peek_n(2),
        );
        let (kind, width) = match (c, n1, n2) {
            (b'.', b'.', b'.') => (T::Ellipsis, 3),
            (b'=', b'=', b'=') => (T::EqEq, 3),
            (b'!', b'=', b'=') => (T::BangEq, 3),
            (b'=', b'=', _) => (T::EqEq, 2),
            (b'!', b'=', _) => (T::BangEq, 2),
            (b'<', b'=', _) => (T::LtEq, 2),
            (b'>', b'=', _) => (T::GtEq, 2),
            (b'&', b'&', _) => (T::AndAnd, 2),
            (b'|', b'|', _) => (T::OrOr, 2),
            (b'+', b'+', _) => (T::PlusPlus, 2),
            (b'-', b'-', _) => (T::MinusMinus, 2),
            (b'+', b'=', _) => (T::PlusEq, 2),
            (b'-', b'=', _) => (T::MinusEq, 2),
            (b'*', b'=', _) => (T::StarEq, 2),
            (b'/', b'=', _) => (T::SlashEq, 2),
            (b'%', b'=', _) => (T::PercentEq, 2),
            (b'(', ..) => (T::LParen, 1),
            (b')', ..) => (T::RParen, 1),
            (b'{', ..) => (T::LBrace, 1),
            (b'}', ..) => (T::RBrace, 1),
            (b'[', ..) => (T::LBracket, 1),
            (b']', ..) => (T::RBracket, 1),
            (b',', ..) => (T::Comma, 1),
            (b'.', ..) => (T::Dot, 1),
            (b';', ..) => (T::Semicolon, 1),
            (b':', ..) => (T::Colon, 1),
            (b'?', ..) => (T::Question, 1),
            (b'+', ..) => (T::Plus, 1),
            (b'-', ..) => (T::Minus, 1),
            (b'*', ..) => (T::Star, 1),
            (b'/', ..) => (T::Slash, 1),
            (b'%', ..) => (T::Percent, 1),
            (b'=', ..) => (T::Eq, 1),
            (b'<', ..) => (T::Lt, 1),
            (b'>', ..) => (T::Gt, 1),
            (b'!', ..) => (T::Bang, 1),
            _ => {
                self.cursor.advance_char();
                let text = self.cursor.slice_from(start);
                return Err(LexError::new(
                    format!("unexpected character `{text}`"),
                    Span::new(start, self.cursor.pos()),
                ));
            }
        };
        self.cursor.advance_n(width);
        Ok(kind)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
