//! Abstract syntax tree definitions for Dilemma expressions.
//!
//! This module is deliberately lightweight: the parser is the only producer
//! of [`Expr`] nodes, and once built a node tree is never mutated.

mod expr;
mod operator;

pub use expr::{pretty, Expr, IsRhs, LiteralValue, PathSegment};
pub use operator::{BinaryOperator, Sentinel, TimeUnit, UnaryOperator, WindowDirection};
