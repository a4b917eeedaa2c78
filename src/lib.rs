//! Dilemma: a safe, embeddable expression evaluator.
//!
//! Dilemma parses a small, deliberately non-Turing-complete expression
//! language — arithmetic, boolean logic, string/date predicates, and a
//! dotted path syntax for reaching into caller-supplied data — and
//! evaluates it against a [`Context`]. An embedded backtick sub-language
//! hands a raw query string to a pluggable [`Resolver`] (a `jq` filter, a
//! JSONPath query, or a custom implementation), so callers can reach into
//! richer data shapes without the core grammar growing to match.
//!
//! ```
//! use dilemma::{evaluate, Value};
//! use indexmap::IndexMap;
//!
//! let mut context = IndexMap::new();
//! context.insert("age".to_string(), Value::Int(42));
//!
//! assert_eq!(evaluate("age > 18", &context).unwrap(), Value::Bool(true));
//! ```
//!
//! For repeated evaluation of the same expression against many contexts,
//! compile it once with [`compile`] and reuse the result.

mod ast;
mod compiler;
mod error;
mod evaluator;
mod model;
mod parser;
mod registry;
mod span;

pub use ast::{
    pretty, BinaryOperator, Expr, IsRhs, LiteralValue, PathSegment, Sentinel, TimeUnit,
    UnaryOperator, WindowDirection,
};
pub use compiler::{clear_cache, compile, CompiledExpression};
pub use error::{DilemmaError, Result};
pub use evaluator::Evaluator;
pub use model::{Context, Now, Value};
pub use parser::parse;
pub use registry::{default_resolver, register_resolver, resolver_by_name, stats as resolver_stats, RegistryStats, Resolver};
pub use span::Span;

/// Parse and evaluate `source` against `context` in one call.
///
/// Equivalent to `compile(source)?.evaluate(context)`, but skips the
/// compiled-expression cache lookup/insert when the expression is only
/// ever going to be evaluated once. For repeated evaluation, prefer
/// [`compile`].
pub fn evaluate(source: &str, context: &Context) -> Result<Value> {
    let expr = parser::parse(source)?;
    Evaluator::new(context).eval(&expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn end_to_end_arithmetic() {
        let context = IndexMap::new();
        assert_eq!(evaluate("2 * (3 + 4)", &context).unwrap(), Value::Int(14));
    }

    #[test]
    fn end_to_end_like_operator() {
        let context = IndexMap::new();
        assert_eq!(
            evaluate("'Hello.TXT' like '*.txt'", &context).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn end_to_end_resolver_error_surfaces_for_unknown_hint() {
        let context = IndexMap::new();
        let err = evaluate("`nope:.x`", &context).unwrap_err();
        assert!(matches!(err, DilemmaError::Resolver { .. }));
    }

    #[test]
    fn compile_then_evaluate_matches_direct_evaluate() {
        let context = IndexMap::new();
        let compiled = compile("1 + 2 * 3").unwrap();
        assert_eq!(compiled.evaluate(&context).unwrap(), evaluate("1 + 2 * 3", &context).unwrap());
    }
}
