//! The always-available fallback resolver: dotted/indexed traversal directly
//! over the in-memory [`Context`], no raw-query support.

use crate::ast::PathSegment;
use crate::error::{DilemmaError, Result};
use crate::model::{Context, Value};
use crate::registry::resolver::Resolver;
use crate::span::Span;

/// Resolves [`crate::ast::Expr::Path`] segments by walking straight through
/// the caller's [`Context`] and any nested [`Value::Map`]/[`Value::List`].
/// Carries no external dependency and is always registered, so a caller
/// with no interest in `jq`/JSONPath still gets a working default.
pub struct BasicResolver;

impl Resolver for BasicResolver {
    fn name(&self) -> &str {
        "basic"
    }

    fn resolve(&self, segments: &[PathSegment], context: &Context, span: Span) -> Result<Value> {
        let mut segments = segments.iter();

        let first = match segments.next() {
            Some(PathSegment::Name(name)) => name,
            Some(PathSegment::Index(_)) => {
                return Err(DilemmaError::resolver(
                    "a path cannot begin with an index",
                    span,
                ))
            }
            None => return Ok(Value::Null),
        };

        let mut current = match context.get(first) {
            Some(value) => value.clone(),
            None => return Ok(Value::Null),
        };

        for segment in segments {
            current = match (&current, segment) {
                (Value::Null, _) => Value::Null,
                (Value::Map(map), PathSegment::Name(name)) => {
                    map.get(name).cloned().unwrap_or(Value::Null)
                }
                (Value::List(list), PathSegment::Index(index)) => list
                    .get(*index as usize)
                    .cloned()
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            };
        }

        Ok(current)
    }
}
