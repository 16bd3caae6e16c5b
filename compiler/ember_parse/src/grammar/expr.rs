//! Expression parsing.

use std::sync::Arc;

use ember_ir::{BinaryOp, Element, Expr, ExprKind, Name, UnaryOp};
use ember_lexer::TokenKind;
use ember_stack::ensure_sufficient_stack;

use crate::error::{ErrorContext, ParseError};
use crate::Parser;

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::OrOr | TokenKind::Or => BinaryOp::Or,
        TokenKind::AndAnd | TokenKind::And => BinaryOp::And,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        _ => return None,
    })
}

fn compound_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::PlusEq => BinaryOp::Add,
        TokenKind::MinusEq => BinaryOp::Sub,
        TokenKind::StarEq => BinaryOp::Mul,
        TokenKind::SlashEq => BinaryOp::Div,
        TokenKind::PercentEq => BinaryOp::Mod,
        _ => return None,
    })
}

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_conditional()?;
        let op = match self.cursor.kind() {
            TokenKind::Eq => None,
            kind => match compound_op(kind) {
                Some(op) => Some(op),
                None => return Ok(target),
            },
        };
        if !target.is_assignable() {
            return Err(ParseError::InvalidAssignmentTarget { span: target.span });
        }
        self.cursor.advance();
        let value = self.parse_expr()?;
        let span = target.span.merge(value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                target: Box::new(target),
                op,
                value: Box::new(value),
            },
            span,
        ))
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary(1)?;
        if !self.cursor.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let then = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Colon)?;
        let otherwise = self.parse_expr()?;
        let span = cond.span.merge(otherwise.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        ))
    }

    /// Precedence climbing over left-associative binary operators.
    fn parse_binary(&mut self, min_power: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = binary_op(self.cursor.kind()) {
            let power = op.binding_power();
            if power < min_power {
                break;
            }
            self.cursor.advance();
            let right = ensure_sufficient_stack(|| self.parse_binary(power + 1))?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.span().start;
        let op = match self.cursor.kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang | TokenKind::Not => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.cursor.advance();
            let operand = ensure_sufficient_stack(|| self.parse_unary())?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                self.cursor.span_from(start),
            ));
        }
        match self.cursor.kind() {
            TokenKind::Await => {
                self.cursor.advance();
                let operand = ensure_sufficient_stack(|| self.parse_unary())?;
                Ok(Expr::new(
                    ExprKind::Await(Box::new(operand)),
                    self.cursor.span_from(start),
                ))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if matches!(self.cursor.advance().kind, TokenKind::PlusPlus) {
                    BinaryOp::Add
                } else {
                    BinaryOp::Sub
                };
                let target = ensure_sufficient_stack(|| self.parse_unary())?;
                self.increment(target, op, start)
            }
            _ => self.parse_postfix(),
        }
    }

    /// `x++`, `++x`, `x--`, `--x` all become `x op= 1` and yield the new value.
    fn increment(&self, target: Expr, op: BinaryOp, start: u32) -> Result<Expr, ParseError> {
        if !target.is_assignable() {
            return Err(ParseError::InvalidAssignmentTarget { span: target.span });
        }
        let span = self.cursor.span_from(start);
        Ok(Expr::new(
            ExprKind::Assign {
                target: Box::new(target),
                op: Some(op),
                value: Box::new(Expr::new(ExprKind::Number(1.0), span)),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.span().start;
        let mut expr = if self.cursor.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            expr = match self.cursor.kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let property = self
                        .cursor
                        .expect_property_name()
                        .map_err(|e| e.in_context(ErrorContext::FieldAccess))?;
                    Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        self.cursor.span_from(start),
                    )
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::RBracket)?;
                    Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        self.cursor.span_from(start),
                    )
                }
                TokenKind::LParen => {
                    let args = self.parse_args()?;
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        self.cursor.span_from(start),
                    )
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus if !self.cursor.newline_before() => {
                    let op = if matches!(self.cursor.advance().kind, TokenKind::PlusPlus) {
                        BinaryOp::Add
                    } else {
                        BinaryOp::Sub
                    };
                    return self.increment(expr, op, start);
                }
                _ => return Ok(expr),
            };
        }
    }

    /// `new Callee.path(args)`; the argument list is optional.
    fn parse_new(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span.start;
        let mut callee = if self.cursor.check(&TokenKind::New) {
            ensure_sufficient_stack(|| self.parse_new())?
        } else {
            self.parse_primary()?
        };
        while self.cursor.eat(&TokenKind::Dot) {
            let property = self.cursor.expect_property_name()?;
            callee = Expr::new(
                ExprKind::Member {
                    object: Box::new(callee),
                    property,
                },
                self.cursor.span_from(start),
            );
        }
        let args = if self.cursor.check(&TokenKind::LParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };
        Ok(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            self.cursor.span_from(start),
        ))
    }

    /// `( element, ... )`
    fn parse_args(&mut self) -> Result<Vec<Element>, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        self.parse_elements(&TokenKind::RParen)
            .map_err(|e| e.in_context(ErrorContext::FunctionCall))
    }

    /// Comma-separated elements with optional spread, up to `close`.
    fn parse_elements(&mut self, close: &TokenKind) -> Result<Vec<Element>, ParseError> {
        let mut elements = Vec::new();
        while !self.cursor.check(close) {
            if self.cursor.eat(&TokenKind::Ellipsis) {
                elements.push(Element::Spread(self.parse_expr()?));
            } else {
                elements.push(Element::Single(self.parse_expr()?));
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(close)?;
        Ok(elements)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.span().start;
        let kind = match self.cursor.kind().clone() {
            TokenKind::Number(n) => {
                self.cursor.advance();
                ExprKind::Number(n)
            }
            TokenKind::Str(s) => {
                self.cursor.advance();
                ExprKind::Str(Name::from(s))
            }
            TokenKind::True => {
                self.cursor.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.cursor.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.cursor.advance();
                ExprKind::Null
            }
            TokenKind::This => {
                self.cursor.advance();
                ExprKind::This
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                ExprKind::Ident(Name::from(name))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.cursor.expect(&TokenKind::RParen)?;
                return Ok(Expr::new(inner.kind, self.cursor.span_from(start)));
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let elements = self
                    .parse_elements(&TokenKind::RBracket)
                    .map_err(|e| e.in_context(ErrorContext::ArrayLiteral))?;
                ExprKind::Array(elements)
            }
            TokenKind::LBrace => self
                .parse_map_literal()
                .map_err(|e| e.in_context(ErrorContext::MapLiteral))?,
            TokenKind::Fn => ExprKind::Function(self.parse_function(false)?),
            TokenKind::Async if matches!(self.cursor.peek_kind(1), TokenKind::Fn) => {
                self.cursor.advance();
                ExprKind::Function(self.parse_function(true)?)
            }
            _ => {
                return Err(self
                    .cursor
                    .unexpected("expression")
                    .in_context(ErrorContext::Expression))
            }
        };
        Ok(Expr::new(kind, self.cursor.span_from(start)))
    }

    /// `{ key: value, "quoted": value, shorthand }`
    fn parse_map_literal(&mut self) -> Result<ExprKind, ParseError> {
        self.cursor.advance();
        let mut entries: Vec<(Name, Expr)> = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let key_span = self.cursor.span();
            let key = match self.cursor.kind().clone() {
                TokenKind::Str(s) => {
                    self.cursor.advance();
                    Name::from(s)
                }
                TokenKind::Number(n) => {
                    self.cursor.advance();
                    Name::from(number_key(n))
                }
                _ => self.cursor.expect_property_name()?,
            };
            let value = if self.cursor.eat(&TokenKind::Colon) {
                self.parse_expr()?
            } else {
                Expr::new(ExprKind::Ident(Arc::clone(&key)), key_span)
            };
            entries.push((key, value));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(ExprKind::Map(entries))
    }
}

/// Numeric map keys are stored the way numbers print.
fn number_key(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
