//! The [`Resolver`] trait: the seam between path/raw-query syntax in an
//! expression and whatever data source a caller wires up.

use crate::ast::PathSegment;
use crate::error::{DilemmaError, Result};
use crate::model::{Context, Value};
use crate::span::Span;

/// Something that can answer a dotted/indexed path or a raw sub-language
/// query against a [`Context`].
///
/// A missing path segment resolves to [`Value::Null`], not an error — only
/// a query the resolver cannot execute at all (a malformed `jq` filter, a
/// backend that doesn't support raw queries) is an error.
pub trait Resolver: Send + Sync {
    /// The name this resolver is registered under.
    fn name(&self) -> &str;

    /// Resolve a dotted/indexed path against `context`.
    fn resolve(&self, segments: &[PathSegment], context: &Context, span: Span) -> Result<Value>;

    /// Resolve a verbatim backtick sub-expression
    /// against `context`. The default implementation reports that this
    /// resolver doesn't support raw queries at all.
    fn resolve_raw(&self, text: &str, context: &Context, span: Span) -> Result<Value> {
        let _ = (text, context);
        Err(DilemmaError::resolver(
            format!("resolver '{}' does not support raw `...` queries", self.name()),
            span,
        ))
    }

    /// Whether [`Resolver::resolve_raw`] is actually implemented.
    fn supports_raw(&self) -> bool {
        false
    }
}
