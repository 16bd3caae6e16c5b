//! Statement parsing.

use ember_ir::{Pattern, Stmt, StmtKind};
use ember_lexer::TokenKind;
use ember_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::error::{ErrorContext, ParseError};
use crate::Parser;

impl Parser {
    /// Parse one statement. Returns `None` for an empty statement (`;`).
    pub(crate) fn parse_stmt(&mut self) -> Result<Option<Stmt>, ParseError> {
        ensure_sufficient_stack(|| self.parse_stmt_inner())
    }

    fn parse_stmt_inner(&mut self) -> Result<Option<Stmt>, ParseError> {
        if self.cursor.eat(&TokenKind::Semicolon) {
            return Ok(None);
        }
        let start = self.cursor.span().start;
        trace!(token = ?self.cursor.kind(), "statement");
        let kind = match self.cursor.kind() {
            TokenKind::Let | TokenKind::Const => self.parse_let()?,
            TokenKind::Fn if matches!(self.cursor.peek_kind(1), TokenKind::Ident(_)) => {
                StmtKind::Function(self.parse_function(false)?)
            }
            TokenKind::Async
                if matches!(self.cursor.peek_kind(1), TokenKind::Fn)
                    && matches!(self.cursor.peek_kind(2), TokenKind::Ident(_)) =>
            {
                self.cursor.advance();
                StmtKind::Function(self.parse_function(true)?)
            }
            TokenKind::Class => StmtKind::Class(self.parse_class()?),
            TokenKind::If => self.parse_if()?,
            TokenKind::While => {
                self.cursor.advance();
                let cond = self.parse_paren_expr()?;
                let body = self.parse_body()?;
                StmtKind::While { cond, body }
            }
            TokenKind::Do => {
                self.cursor.advance();
                let body = self.parse_body()?;
                self.cursor.expect(&TokenKind::While)?;
                let cond = self.parse_paren_expr()?;
                StmtKind::DoWhile { body, cond }
            }
            TokenKind::For => self
                .parse_for()
                .map_err(|e| e.in_context(ErrorContext::ForLoop))?,
            TokenKind::Break => {
                self.cursor.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.cursor.advance();
                StmtKind::Continue
            }
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.at_stmt_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                StmtKind::Return(value)
            }
            TokenKind::Throw => {
                self.cursor.advance();
                StmtKind::Throw(self.parse_expr()?)
            }
            TokenKind::Try => self
                .parse_try()
                .map_err(|e| e.in_context(ErrorContext::TryStatement))?,
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            _ => StmtKind::Expr(
                self.parse_expr()
                    .map_err(|e| e.in_context(ErrorContext::Statement))?,
            ),
        };
        self.cursor.eat(&TokenKind::Semicolon);
        Ok(Some(Stmt::new(kind, self.cursor.span_from(start))))
    }

    /// Whether the current token ends a value-less `return`.
    fn at_stmt_end(&self) -> bool {
        self.cursor.newline_before()
            || matches!(
                self.cursor.kind(),
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            )
    }

    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.cursor
            .expect(&TokenKind::LBrace)
            .map_err(|e| e.in_context(ErrorContext::Block))?;
        let mut body = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            if self.cursor.at_eof() {
                return Err(self
                    .cursor
                    .unexpected(&TokenKind::RBrace.to_string())
                    .in_context(ErrorContext::Block));
            }
            if let Some(stmt) = self.parse_stmt()? {
                body.push(stmt);
            }
        }
        self.cursor.advance();
        Ok(body)
    }

    /// Body of a loop or branch: any statement; an empty `;` becomes an empty block.
    fn parse_body(&mut self) -> Result<Box<Stmt>, ParseError> {
        let start = self.cursor.span().start;
        let stmt = self
            .parse_stmt()?
            .unwrap_or_else(|| {
                Stmt::new(StmtKind::Block(Vec::new()), self.cursor.span_from(start))
            });
        Ok(Box::new(stmt))
    }

    fn parse_paren_expr(&mut self) -> Result<ember_ir::Expr, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_let(&mut self) -> Result<StmtKind, ParseError> {
        let constant = matches!(self.cursor.advance().kind, TokenKind::Const);
        let pattern = self.parse_pattern()?;
        let value = if self.cursor.eat(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        if constant && value.is_none() {
            return Err(ParseError::MissingConstInitializer {
                span: self.cursor.span(),
            });
        }
        Ok(StmtKind::Let {
            pattern,
            value,
            constant,
        })
    }

    fn parse_if(&mut self) -> Result<StmtKind, ParseError> {
        self.cursor.advance();
        let cond = self.parse_paren_expr()?;
        let then = self.parse_body()?;
        let otherwise = if self.cursor.eat(&TokenKind::Else) {
            Some(self.parse_body()?)
        } else {
            None
        };
        Ok(StmtKind::If {
            cond,
            then,
            otherwise,
        })
    }

    /// `for (init; cond; update)`, `for (let k in obj)`, `for (let v of xs)`.
    fn parse_for(&mut self) -> Result<StmtKind, ParseError> {
        self.cursor.advance();
        self.cursor.expect(&TokenKind::LParen)?;

        let init_start = self.cursor.span().start;
        let declared = matches!(self.cursor.kind(), TokenKind::Let | TokenKind::Const);
        let bare_ident = matches!(self.cursor.kind(), TokenKind::Ident(_))
            && (matches!(self.cursor.peek_kind(1), TokenKind::In)
                || matches!(self.cursor.peek_kind(1), TokenKind::Ident(w) if w == "of"));

        if declared || bare_ident {
            let constant = declared && matches!(self.cursor.advance().kind, TokenKind::Const);
            let pattern = self.parse_pattern()?;
            if self.cursor.eat(&TokenKind::In) {
                return self.finish_for_each(pattern, true);
            }
            if self.cursor.check_contextual("of") {
                self.cursor.advance();
                return self.finish_for_each(pattern, false);
            }
            let value = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let init = Stmt::new(
                StmtKind::Let {
                    pattern,
                    value,
                    constant,
                },
                self.cursor.span_from(init_start),
            );
            return self.finish_c_style(Some(Box::new(init)));
        }

        let init = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            let expr = self.parse_expr()?;
            Some(Box::new(Stmt::new(
                StmtKind::Expr(expr),
                self.cursor.span_from(init_start),
            )))
        };
        self.finish_c_style(init)
    }

    fn finish_for_each(&mut self, pattern: Pattern, keys: bool) -> Result<StmtKind, ParseError> {
        let iterable = self.parse_expr()?;
        self.cursor.expect(&TokenKind::RParen)?;
        let body = self.parse_body()?;
        Ok(if keys {
            StmtKind::ForIn {
                pattern,
                iterable,
                body,
            }
        } else {
            StmtKind::ForOf {
                pattern,
                iterable,
                body,
            }
        })
    }

    fn finish_c_style(&mut self, init: Option<Box<Stmt>>) -> Result<StmtKind, ParseError> {
        self.cursor.expect(&TokenKind::Semicolon)?;
        let cond = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::Semicolon)?;
        let update = if self.cursor.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::RParen)?;
        let body = self.parse_body()?;
        Ok(StmtKind::For {
            init,
            cond,
            update,
            body,
        })
    }

    fn parse_try(&mut self) -> Result<StmtKind, ParseError> {
        self.cursor.advance();
        let block = self.parse_block()?;
        let catch = if self.cursor.eat(&TokenKind::Catch) {
            let param = if self.cursor.eat(&TokenKind::LParen) {
                let pattern = self.parse_pattern()?;
                self.cursor.expect(&TokenKind::RParen)?;
                Some(pattern)
            } else {
                None
            };
            Some((param, self.parse_block()?))
        } else {
            None
        };
        let finally = if self.cursor.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catch.is_none() && finally.is_none() {
            return Err(self.cursor.unexpected("`catch` or `finally`"));
        }
        Ok(StmtKind::Try {
            block,
            catch,
            finally,
        })
    }
}
