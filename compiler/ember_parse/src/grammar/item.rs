//! Functions, classes and binding patterns.

use std::sync::Arc;

use ember_ir::{ClassDecl, ClassMember, FunctionDecl, MemberKind, Name, Param, Pattern};
use ember_lexer::TokenKind;
use tracing::trace;

use crate::error::{ErrorContext, ParseError};
use crate::Parser;

impl Parser {
    /// `fn name?(params) { body }`; the cursor sits on `fn`.
    pub(crate) fn parse_function(
        &mut self,
        is_async: bool,
    ) -> Result<Arc<FunctionDecl>, ParseError> {
        let start = self.cursor.span().start;
        self.cursor.expect(&TokenKind::Fn)?;
        let name = match self.cursor.kind() {
            TokenKind::Ident(_) => Some(self.cursor.expect_ident()?),
            _ => None,
        };
        trace!(?name, is_async, "function");
        self.parse_function_rest(name, is_async, start)
            .map_err(|e| e.in_context(ErrorContext::FunctionDef))
    }

    /// Parameter list and body, shared by functions and class members.
    fn parse_function_rest(
        &mut self,
        name: Option<Name>,
        is_async: bool,
        start: u32,
    ) -> Result<Arc<FunctionDecl>, ParseError> {
        let params = self
            .parse_params()
            .map_err(|e| e.in_context(ErrorContext::FunctionParams))?;
        let body = self.parse_block()?;
        Ok(Arc::new(FunctionDecl {
            name,
            params,
            body,
            is_async,
            span: self.cursor.span_from(start),
        }))
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let rest_span = self.cursor.span();
            let rest = self.cursor.eat(&TokenKind::Ellipsis);
            let name = self.cursor.expect_ident()?;
            let default = if !rest && self.cursor.eat(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param {
                name,
                default,
                rest,
            });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
            if rest {
                return Err(ParseError::RestNotLast {
                    span: rest_span,
                    context: None,
                });
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// `class Name { members }`
    pub(crate) fn parse_class(&mut self) -> Result<Arc<ClassDecl>, ParseError> {
        let start = self.cursor.span().start;
        self.cursor.advance();
        let name = self.cursor.expect_ident()?;
        trace!(%name, "class");
        self.parse_class_body()
            .map(|members| {
                Arc::new(ClassDecl {
                    name,
                    members,
                    span: self.cursor.span_from(start),
                })
            })
            .map_err(|e| e.in_context(ErrorContext::ClassDef))
    }

    fn parse_class_body(&mut self) -> Result<Vec<ClassMember>, ParseError> {
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.cursor.eat(&TokenKind::RBrace) {
            if self.cursor.at_eof() {
                return Err(self.cursor.unexpected("`}`"));
            }
            if self.cursor.eat(&TokenKind::Semicolon) {
                continue;
            }
            members.push(self.parse_member()?);
        }
        Ok(members)
    }

    fn parse_member(&mut self) -> Result<ClassMember, ParseError> {
        let start = self.cursor.span().start;
        let is_static = self.modifier(&TokenKind::Static);
        let is_async = self.modifier(&TokenKind::Async);
        let accessor = if !is_async
            && (self.cursor.check_contextual("get") || self.cursor.check_contextual("set"))
            && self.names_member(1)
        {
            match self.cursor.advance().kind {
                TokenKind::Ident(word) if word == "get" => Some(true),
                _ => Some(false),
            }
        } else {
            None
        };
        let name = match self.cursor.kind().clone() {
            TokenKind::Str(s) => {
                self.cursor.advance();
                Name::from(s)
            }
            _ => self.cursor.expect_property_name()?,
        };

        let kind = if self.cursor.check(&TokenKind::LParen) {
            let decl = self.parse_function_rest(Some(Arc::clone(&name)), is_async, start)?;
            match accessor {
                Some(true) => MemberKind::Getter(decl),
                Some(false) => MemberKind::Setter(decl),
                None => MemberKind::Method(decl),
            }
        } else {
            let init = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.cursor.eat(&TokenKind::Semicolon);
            MemberKind::Field(init)
        };
        Ok(ClassMember {
            name,
            kind,
            is_static,
            span: self.cursor.span_from(start),
        })
    }

    /// Consume `keyword` if it modifies a following member rather than
    /// naming the member itself (`static()` is a method called `static`).
    fn modifier(&mut self, keyword: &TokenKind) -> bool {
        if self.cursor.check(keyword) && self.names_member(1) {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    /// Whether the token `n` ahead can start a member name.
    fn names_member(&self, n: usize) -> bool {
        let kind = self.cursor.peek_kind(n);
        matches!(kind, TokenKind::Ident(_) | TokenKind::Str(_)) || kind.keyword_text().is_some()
    }

    /// Binding pattern: identifier, `[a, , ...rest]` or `{ a, b: alias }`.
    pub(crate) fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        match self.cursor.kind() {
            TokenKind::LBracket => self
                .parse_array_pattern()
                .map_err(|e| e.in_context(ErrorContext::Pattern)),
            TokenKind::LBrace => self
                .parse_object_pattern()
                .map_err(|e| e.in_context(ErrorContext::Pattern)),
            _ => Ok(Pattern::Ident(self.cursor.expect_ident()?)),
        }
    }

    fn parse_array_pattern(&mut self) -> Result<Pattern, ParseError> {
        self.cursor.advance();
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.cursor.check(&TokenKind::RBracket) {
            if self.cursor.eat(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            if self.cursor.check(&TokenKind::Ellipsis) {
                let span = self.cursor.advance().span;
                rest = Some(self.cursor.expect_ident()?);
                if !self.cursor.check(&TokenKind::RBracket) {
                    return Err(ParseError::RestNotLast {
                        span,
                        context: None,
                    });
                }
                break;
            }
            elements.push(Some(self.parse_pattern()?));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBracket)?;
        Ok(Pattern::Array { elements, rest })
    }

    fn parse_object_pattern(&mut self) -> Result<Pattern, ParseError> {
        self.cursor.advance();
        let mut props = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let key = self.cursor.expect_property_name()?;
            let target = if self.cursor.eat(&TokenKind::Colon) {
                self.parse_pattern()?
            } else {
                Pattern::Ident(Arc::clone(&key))
            };
            props.push((key, target));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(Pattern::Object(props))
    }
}
