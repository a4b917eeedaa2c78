//! The expression AST.
//!
//! Frequently used leaf variants are unboxed; larger compound variants are
//! boxed so [`Expr`] stays small and cheap to move around the parser and
//! evaluator.

use std::fmt;

use smallvec::SmallVec;

use crate::ast::operator::{BinaryOperator, Sentinel, TimeUnit, UnaryOperator, WindowDirection};
use crate::span::Span;

/// One segment of a dotted/indexed [`Expr::Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field, e.g. the `profile` in `user.profile`.
    Name(String),
    /// A non-negative index, e.g. the `0` in `teams[0]`.
    Index(u64),
}

/// A literal value as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// An integer literal such as `42`.
    Integer(i64),
    /// A decimal literal such as `3.14`.
    Float(f64),
    /// A single- or double-quoted string literal.
    String(String),
    /// `true`/`false`.
    Boolean(bool),
    /// A `$past`/`$future`/`$today`/`$now`/`$empty` sentinel.
    Sentinel(Sentinel),
}

/// A parsed Dilemma expression node.
///
/// The variant set is closed and fixed: `Literal`, `Path`,
/// `RawPath`, `BinaryOp`, `UnaryOp`, `IsCheck`, `TimeWindow`.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal value.
    Literal {
        /// The literal's value.
        value: LiteralValue,
        /// Source span.
        span: Span,
    },

    /// A dotted/indexed path, e.g. `teams[0].name`.
    Path {
        /// Path segments in left-to-right order.
        segments: SmallVec<[PathSegment; 4]>,
        /// Source span.
        span: Span,
    },

    /// A verbatim backtick sub-expression, handed to a resolver unmodified.
    RawPath {
        /// The raw text inside the backticks, uninterpreted.
        text: String,
        /// An optional resolver-name hint carried by legacy syntaxes
        ///; `None` means "use the default resolver".
        resolver_hint: Option<String>,
        /// Source span.
        span: Span,
    },

    /// A binary operation: `left <op> right`.
    BinaryOp {
        /// The operator.
        op: BinaryOperator,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Source span covering both operands and the operator.
        span: Span,
    },

    /// A unary operation: `<op> operand`.
    UnaryOp {
        /// The operator.
        op: UnaryOperator,
        /// The operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },

    /// `subject is <tag>` / `subject is <expr>`.
    IsCheck {
        /// The subject expression.
        subject: Box<Expr>,
        /// Either a sentinel tag or an arbitrary reference expression;
        /// a non-sentinel right-hand side is treated as equality.
        rhs: IsRhs,
        /// Source span.
        span: Span,
    },

    /// `subject within|older than <quantity> <unit>`.
    TimeWindow {
        /// The subject expression.
        subject: Box<Expr>,
        /// The numeric quantity expression.
        quantity: Box<Expr>,
        /// The unit the quantity is expressed in.
        unit: TimeUnit,
        /// `within` or `older than`.
        direction: WindowDirection,
        /// Source span.
        span: Span,
    },
}

/// The right-hand side of an `is` check: either a sentinel tag or an
/// arbitrary expression compared for equality.
#[derive(Debug, Clone, PartialEq)]
pub enum IsRhs {
    /// `x is $empty` / `x is $past` / etc.
    Sentinel(Sentinel),
    /// `x is <expr>`, treated as `x == <expr>`.
    Expr(Box<Expr>),
}

impl Expr {
    /// The source span of this node.
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Path { span, .. }
            | Expr::RawPath { span, .. }
            | Expr::BinaryOp { span, .. }
            | Expr::UnaryOp { span, .. }
            | Expr::IsCheck { span, .. }
            | Expr::TimeWindow { span, .. } => *span,
        }
    }
}

// Structural equality on purpose ignores `span`: two ASTs parsed from
// different source text (e.g. an original expression and its pretty-printed
// round-trip) are the same tree even though their byte offsets differ.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Literal { value: a, .. }, Expr::Literal { value: b, .. }) => a == b,
            (Expr::Path { segments: a, .. }, Expr::Path { segments: b, .. }) => a == b,
            (
                Expr::RawPath {
                    text: at,
                    resolver_hint: ah,
                    ..
                },
                Expr::RawPath {
                    text: bt,
                    resolver_hint: bh,
                    ..
                },
            ) => at == bt && ah == bh,
            (
                Expr::BinaryOp {
                    op: ao,
                    left: al,
                    right: ar,
                    ..
                },
                Expr::BinaryOp {
                    op: bo,
                    left: bl,
                    right: br,
                    ..
                },
            ) => ao == bo && al == bl && ar == br,
            (
                Expr::UnaryOp { op: ao, operand: aop, .. },
                Expr::UnaryOp { op: bo, operand: bop, .. },
            ) => ao == bo && aop == bop,
            (
                Expr::IsCheck {
                    subject: asub,
                    rhs: arhs,
                    ..
                },
                Expr::IsCheck {
                    subject: bsub,
                    rhs: brhs,
                    ..
                },
            ) => asub == bsub && arhs == brhs,
            (
                Expr::TimeWindow {
                    subject: asub,
                    quantity: aqty,
                    unit: au,
                    direction: adir,
                    ..
                },
                Expr::TimeWindow {
                    subject: bsub,
                    quantity: bqty,
                    unit: bu,
                    direction: bdir,
                    ..
                },
            ) => asub == bsub && aqty == bqty && au == bu && adir == bdir,
            _ => false,
        }
    }
}

/// Render a string literal's contents back into a single-quoted, escaped
/// source form.
fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            // `{:?}` always prints a decimal point (`3.0`, not `3`), which is
            // what keeps a re-parse a `Float` rather than an `Integer`.
            Self::Float(n) => write!(f, "{n:?}"),
            Self::String(s) => write!(f, "{}", escape_string(s)),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Sentinel(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Renders `expr` back into Dilemma source text.
///
/// Every compound node is fully parenthesized, so the result always
/// re-parses to an AST equal to the original regardless of operator
/// precedence; this trades "reads like hand-written source" for
/// "guaranteed round-trip", which is the property the pretty-printer exists
/// for.
pub fn pretty(expr: &Expr) -> String {
    expr.to_string()
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value, .. } => write!(f, "{value}"),
            Expr::Path { segments, .. } => {
                for (i, segment) in segments.iter().enumerate() {
                    match segment {
                        PathSegment::Name(name) if i == 0 => write!(f, "{name}")?,
                        PathSegment::Name(name) => write!(f, ".{name}")?,
                        PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                    }
                }
                Ok(())
            }
            Expr::RawPath {
                text,
                resolver_hint,
                ..
            } => match resolver_hint {
                Some(hint) => write!(f, "`{hint}:{text}`"),
                None => write!(f, "`{text}`"),
            },
            Expr::BinaryOp { op, left, right, .. } => write!(f, "({left} {op} {right})"),
            Expr::UnaryOp { op, operand, .. } => write!(f, "({op} {operand})"),
            Expr::IsCheck { subject, rhs, .. } => match rhs {
                IsRhs::Sentinel(s) => write!(f, "({subject} is {s})"),
                IsRhs::Expr(rhs) => write!(f, "({subject} is {rhs})"),
            },
            Expr::TimeWindow {
                subject,
                quantity,
                unit,
                direction,
                ..
            } => write!(f, "({subject} {direction} {quantity} {unit})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_carry_names_and_indices() {
        let expr = Expr::Path {
            segments: SmallVec::from_vec(vec![
                PathSegment::Name("teams".into()),
                PathSegment::Index(0),
                PathSegment::Name("name".into()),
            ]),
            span: Span::new(0, 14),
        };
        match expr {
            Expr::Path { segments, .. } => assert_eq!(segments.len(), 3),
            _ => panic!("expected Path"),
        }
    }

    #[test]
    fn equality_ignores_span() {
        let a = Expr::Literal {
            value: LiteralValue::Integer(1),
            span: Span::new(0, 1),
        };
        let b = Expr::Literal {
            value: LiteralValue::Integer(1),
            span: Span::new(50, 51),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn pretty_prints_a_fully_parenthesized_binary_op() {
        let expr = Expr::BinaryOp {
            op: BinaryOperator::Equal,
            left: Box::new(Expr::Path {
                segments: SmallVec::from_vec(vec![PathSegment::Name("count".into())]),
                span: Span::new(0, 5),
            }),
            right: Box::new(Expr::Literal {
                value: LiteralValue::Integer(0),
                span: Span::new(9, 10),
            }),
            span: Span::new(0, 10),
        };
        assert_eq!(pretty(&expr), "(count == 0)");
    }

    #[test]
    fn pretty_prints_string_literals_with_escapes() {
        let expr = Expr::Literal {
            value: LiteralValue::String("it's a \"test\"\n".into()),
            span: Span::new(0, 1),
        };
        assert_eq!(pretty(&expr), "'it\\'s a \"test\"\\n'");
    }

    #[test]
    fn span_accessor_covers_all_variants() {
        let lit = Expr::Literal {
            value: LiteralValue::Integer(1),
            span: Span::new(0, 1),
        };
        assert_eq!(lit.span(), Span::new(0, 1));
    }
}
