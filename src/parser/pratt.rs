//! Recursive-descent / precedence-climbing parser producing an [`Expr`] tree
//! from a token stream.
//!
//! Precedence, low to high: `or` < `and` < `not` < comparison/predicate <
//! additive < multiplicative < unary `-`. `not` wraps an entire
//! comparison/predicate expression (`not a == b` is `not (a == b)`, not
//! `(not a) == b`), not just a primary value — unary `-` is the only
//! operator handled at the true unary level. Comparison and predicate
//! operators (`==`, `<`, `in`, `like`, `before`, `is`, `within`, ...) sit at
//! a single shared level and do not chain — `a < b < c` is a parse error,
//! not left-to-right association, because chaining would silently change
//! meaning depending on operand types.

use smallvec::SmallVec;

use crate::ast::{
    BinaryOperator, Expr, IsRhs, LiteralValue, PathSegment, TimeUnit, UnaryOperator,
    WindowDirection,
};
use crate::error::{DilemmaError, Result};
use crate::parser::lexer::{Lexer, SpannedToken, Token};
use crate::span::Span;

/// Parse a complete Dilemma expression from source text.
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    log::debug!("parsed expression of {} bytes", source.len());
    Ok(expr)
}

struct Parser<'input> {
    tokens: Vec<SpannedToken<'input>>,
    pos: usize,
}

impl<'input> Parser<'input> {
    fn peek(&self) -> &Token<'input> {
        &self.tokens[self.pos].token
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> SpannedToken<'input> {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&mut self) -> Result<()> {
        match self.peek() {
            Token::Eof => Ok(()),
            _ => Err(DilemmaError::parse(
                "unexpected trailing input",
                self.peek_span(),
            )),
        }
    }

    fn expect_rparen(&mut self) -> Result<Span> {
        match self.peek() {
            Token::RParen => Ok(self.advance().span),
            _ => Err(DilemmaError::parse("expected ')'", self.peek_span())),
        }
    }

    fn expect_rbracket(&mut self) -> Result<Span> {
        match self.peek() {
            Token::RBracket => Ok(self.advance().span),
            _ => Err(DilemmaError::parse("expected ']'", self.peek_span())),
        }
    }

    // or
    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            let span = left.span().join(right.span());
            left = Expr::BinaryOp {
                op: BinaryOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    // and
    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_not()?;
        while matches!(self.peek(), Token::And) {
            self.advance();
            let right = self.parse_not()?;
            let span = left.span().join(right.span());
            left = Expr::BinaryOp {
                op: BinaryOperator::And,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    // not (wraps a whole comparison/predicate, per §6.2's
    // `not_expr := 'not' not_expr | cmp_expr`)
    fn parse_not(&mut self) -> Result<Expr> {
        if matches!(self.peek(), Token::Not) {
            let start = self.advance().span;
            let operand = self.parse_not()?;
            let span = start.join(operand.span());
            return Ok(Expr::UnaryOp {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_comparison()
    }

    // comparison / predicate (non-chaining)
    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_additive()?;
        let node = self.try_parse_predicate(left)?;
        if self.is_predicate_start() {
            return Err(DilemmaError::parse(
                "comparisons do not chain; wrap one side in parentheses",
                self.peek_span(),
            ));
        }
        Ok(node)
    }

    fn is_predicate_start(&self) -> bool {
        matches!(
            self.peek(),
            Token::EqEq
                | Token::NotEq
                | Token::Lt
                | Token::LtEq
                | Token::Gt
                | Token::GtEq
                | Token::In
                | Token::Contains
                | Token::Like
                | Token::Before
                | Token::After
                | Token::SameDayAs
                | Token::Is
                | Token::Within
                | Token::Older
        )
    }

    fn try_parse_predicate(&mut self, left: Expr) -> Result<Expr> {
        match self.peek() {
            Token::EqEq => self.binary_predicate(left, BinaryOperator::Equal),
            Token::NotEq => self.binary_predicate(left, BinaryOperator::NotEqual),
            Token::Lt => self.binary_predicate(left, BinaryOperator::LessThan),
            Token::LtEq => self.binary_predicate(left, BinaryOperator::LessThanOrEqual),
            Token::Gt => self.binary_predicate(left, BinaryOperator::GreaterThan),
            Token::GtEq => self.binary_predicate(left, BinaryOperator::GreaterThanOrEqual),
            Token::In => self.binary_predicate(left, BinaryOperator::In),
            Token::Contains => self.binary_predicate(left, BinaryOperator::Contains),
            Token::Like => self.binary_predicate(left, BinaryOperator::Like),
            Token::Before => self.binary_predicate(left, BinaryOperator::Before),
            Token::After => self.binary_predicate(left, BinaryOperator::After),
            Token::SameDayAs => self.binary_predicate(left, BinaryOperator::SameDayAs),
            Token::Is => self.parse_is(left),
            Token::Within => self.parse_time_window(left, WindowDirection::Within),
            Token::Older => self.parse_older_than(left),
            _ => Ok(left),
        }
    }

    fn binary_predicate(&mut self, left: Expr, op: BinaryOperator) -> Result<Expr> {
        self.advance();
        let right = self.parse_additive()?;
        let span = left.span().join(right.span());
        Ok(Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    fn parse_is(&mut self, subject: Expr) -> Result<Expr> {
        self.advance(); // `is`
        let tag_span = self.peek_span();
        let rhs = match self.peek().clone() {
            Token::Sentinel(tag) => {
                self.advance();
                IsRhs::Sentinel(tag)
            }
            _ => IsRhs::Expr(Box::new(self.parse_additive()?)),
        };
        let rhs_span = match &rhs {
            IsRhs::Sentinel(_) => tag_span,
            IsRhs::Expr(expr) => expr.span(),
        };
        let span = subject.span().join(rhs_span);
        Ok(Expr::IsCheck {
            subject: Box::new(subject),
            rhs,
            span,
        })
    }

    fn parse_time_window(&mut self, subject: Expr, direction: WindowDirection) -> Result<Expr> {
        self.advance(); // `within`
        self.parse_time_window_tail(subject, direction)
    }

    fn parse_older_than(&mut self, subject: Expr) -> Result<Expr> {
        self.advance(); // `older`
        match self.peek() {
            Token::Than => {
                self.advance();
            }
            _ => {
                return Err(DilemmaError::parse(
                    "expected 'than' after 'older'",
                    self.peek_span(),
                ))
            }
        }
        self.parse_time_window_tail(subject, WindowDirection::OlderThan)
    }

    fn parse_time_window_tail(
        &mut self,
        subject: Expr,
        direction: WindowDirection,
    ) -> Result<Expr> {
        let quantity = self.parse_additive()?;
        let unit_span = self.peek_span();
        let unit = match self.peek().clone() {
            Token::Identifier(name) => TimeUnit::from_str(name).ok_or_else(|| {
                DilemmaError::parse(format!("'{name}' is not a recognized time unit"), unit_span)
            }),
            _ => Err(DilemmaError::parse(
                "expected a time unit (e.g. 'days', 'weeks')",
                unit_span,
            )),
        }?;
        self.advance();
        let span = subject.span().join(unit_span);
        Ok(Expr::TimeWindow {
            subject: Box::new(subject),
            quantity: Box::new(quantity),
            unit,
            direction,
            span,
        })
    }

    // additive
    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = left.span().join(right.span());
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    // multiplicative
    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span().join(right.span());
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    // unary (only `-`; `not` sits above comparison, see `parse_not`)
    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Token::Minus => {
                let start = self.advance().span;
                let operand = self.parse_unary()?;
                let span = start.join(operand.span());
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let span = self.peek_span();
        match self.peek().clone() {
            Token::Integer(n) => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::Integer(n),
                    span,
                })
            }
            Token::Float(f) => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::Float(f),
                    span,
                })
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::String(s),
                    span,
                })
            }
            Token::True => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::Boolean(true),
                    span,
                })
            }
            Token::False => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::Boolean(false),
                    span,
                })
            }
            Token::Sentinel(tag) => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::Sentinel(tag),
                    span,
                })
            }
            Token::Raw { text, hint } => {
                self.advance();
                Ok(Expr::RawPath {
                    text: text.to_string(),
                    resolver_hint: hint.map(str::to_string),
                    span,
                })
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_or()?;
                let close = self.expect_rparen()?;
                // Parentheses group only; the inner span already covers the
                // enclosed expression, so we widen it to include the parens.
                let _ = close;
                Ok(inner)
            }
            Token::Identifier(_) => self.parse_path(),
            Token::Slash => Err(DilemmaError::parse(
                "a leading '/' is not a valid expression; slash-delimited paths \
                 like '/user/age' are not supported — use a dotted path like 'user.age'",
                span,
            )),
            _ => Err(DilemmaError::parse("expected an expression", span)),
        }
    }

    fn parse_path(&mut self) -> Result<Expr> {
        let start_span = self.peek_span();
        let first = match self.advance().token {
            Token::Identifier(name) => name,
            _ => unreachable!("parse_path called only when an identifier is next"),
        };

        let mut segments: SmallVec<[PathSegment; 4]> = SmallVec::new();
        segments.push(PathSegment::Name(first.to_string()));
        let mut end_span = start_span;

        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let seg_span = self.peek_span();
                    match self.advance().token {
                        Token::Identifier(name) => {
                            segments.push(PathSegment::Name(name.to_string()));
                            end_span = seg_span;
                        }
                        _ => {
                            return Err(DilemmaError::parse(
                                "expected a field name after '.'",
                                seg_span,
                            ))
                        }
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let idx_span = self.peek_span();
                    let idx = match self.advance().token {
                        Token::Integer(n) if n >= 0 => n as u64,
                        _ => {
                            return Err(DilemmaError::parse(
                                "expected a non-negative index inside '[...]'",
                                idx_span,
                            ))
                        }
                    };
                    segments.push(PathSegment::Index(idx));
                    end_span = self.expect_rbracket()?;
                }
                _ => break,
            }
        }

        Ok(Expr::Path {
            segments,
            span: start_span.join(end_span),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Sentinel as SentinelTag;

    #[test]
    fn parses_arithmetic_with_correct_precedence() {
        let expr = parse("2 * (3 + 4)").unwrap();
        match expr {
            Expr::BinaryOp { op: BinaryOperator::Multiply, left, right, .. } => {
                assert!(matches!(*left, Expr::Literal { value: LiteralValue::Integer(2), .. }));
                assert!(matches!(*right, Expr::BinaryOp { op: BinaryOperator::Add, .. }));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn parses_dotted_and_indexed_path() {
        let expr = parse("teams[0].name").unwrap();
        match expr {
            Expr::Path { segments, .. } => {
                assert_eq!(
                    segments.into_vec(),
                    vec![
                        PathSegment::Name("teams".into()),
                        PathSegment::Index(0),
                        PathSegment::Name("name".into()),
                    ]
                );
            }
            other => panic!("expected Path, got {other:?}"),
        }
    }

    #[test]
    fn rejects_chained_comparisons() {
        assert!(parse("1 < 2 < 3").is_err());
    }

    #[test]
    fn not_wraps_the_whole_comparison_not_just_the_left_operand() {
        let expr = parse("not count == 0").unwrap();
        match expr {
            Expr::UnaryOp { op: UnaryOperator::Not, operand, .. } => {
                assert!(matches!(*operand, Expr::BinaryOp { op: BinaryOperator::Equal, .. }));
            }
            other => panic!("expected Not(Equal(..)), got {other:?}"),
        }
    }

    #[test]
    fn not_binds_looser_than_unary_minus() {
        let expr = parse("not -1 == -1").unwrap();
        match expr {
            Expr::UnaryOp { op: UnaryOperator::Not, operand, .. } => {
                assert!(matches!(*operand, Expr::BinaryOp { op: BinaryOperator::Equal, .. }));
            }
            other => panic!("expected Not(Equal(..)), got {other:?}"),
        }
    }

    #[test]
    fn parses_is_sentinel() {
        let expr = parse("event.created is $past").unwrap();
        match expr {
            Expr::IsCheck { rhs: IsRhs::Sentinel(SentinelTag::Past), .. } => {}
            other => panic!("expected IsCheck(Past), got {other:?}"),
        }
    }

    #[test]
    fn parses_is_expr_as_equality() {
        let expr = parse("user.role is 'admin'").unwrap();
        assert!(matches!(expr, Expr::IsCheck { rhs: IsRhs::Expr(_), .. }));
    }

    #[test]
    fn parses_older_than_time_window() {
        let expr = parse("event.seenAt older than 1 week").unwrap();
        match expr {
            Expr::TimeWindow { direction: WindowDirection::OlderThan, unit: TimeUnit::Week, .. } => {}
            other => panic!("expected TimeWindow(OlderThan, Week), got {other:?}"),
        }
    }

    #[test]
    fn parses_within_time_window() {
        let expr = parse("event.seenAt within 2 days").unwrap();
        match expr {
            Expr::TimeWindow { direction: WindowDirection::Within, unit: TimeUnit::Day, .. } => {}
            other => panic!("expected TimeWindow(Within, Day), got {other:?}"),
        }
    }

    #[test]
    fn parses_raw_backtick_block_with_hint() {
        let expr = parse("`jsonpath:$.user.roles[0]`").unwrap();
        match expr {
            Expr::RawPath { text, resolver_hint: Some(hint), .. } => {
                assert_eq!(text, "$.user.roles[0]");
                assert_eq!(hint, "jsonpath");
            }
            other => panic!("expected RawPath with hint, got {other:?}"),
        }
    }

    #[test]
    fn rejects_legacy_slash_path() {
        let err = parse("/user/profile/age").unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("slash"), "unexpected message: {message}");
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("true or false and false").unwrap();
        match expr {
            Expr::BinaryOp { op: BinaryOperator::Or, right, .. } => {
                assert!(matches!(*right, Expr::BinaryOp { op: BinaryOperator::And, .. }));
            }
            other => panic!("expected Or at top level, got {other:?}"),
        }
    }

    #[test]
    fn membership_and_contains_parse_as_binary_ops() {
        let expr = parse("'admin' in user.roles").unwrap();
        assert!(matches!(expr, Expr::BinaryOp { op: BinaryOperator::In, .. }));

        let expr = parse("user.roles contains 'admin'").unwrap();
        assert!(matches!(expr, Expr::BinaryOp { op: BinaryOperator::Contains, .. }));
    }
}
