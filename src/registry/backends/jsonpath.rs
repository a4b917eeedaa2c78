//! A resolver backed by the `jsonpath-rust` crate.
//!
//! Handles both dotted `Path` segments (translated into an equivalent
//! `$.a.b[0]` query) and raw JSONPath queries from a backtick block. Always
//! available, unlike the `jq` backend — JSONPath has no filter-compilation
//! step to probe at startup.

use jsonpath_rust::JsonPathQuery;

use crate::ast::PathSegment;
use crate::error::{DilemmaError, Result};
use crate::model::{Context, Value};
use crate::registry::resolver::Resolver;
use crate::span::Span;

/// Resolver backed by `jsonpath-rust`.
pub struct JsonPathResolver;

impl JsonPathResolver {
    fn path_to_query(segments: &[PathSegment]) -> String {
        let mut query = String::from("$");
        for segment in segments {
            match segment {
                PathSegment::Name(name) => {
                    query.push('.');
                    query.push_str(name);
                }
                PathSegment::Index(index) => {
                    query.push('[');
                    query.push_str(&index.to_string());
                    query.push(']');
                }
            }
        }
        query
    }

    fn run_query(query: &str, context: &Context, span: Span) -> Result<Value> {
        let input = Value::Map(context.clone()).to_json();
        let matches = input
            .path(query)
            .map_err(|e| DilemmaError::resolver(format!("invalid JSONPath query '{query}': {e}"), span))?;

        let results = match matches {
            serde_json::Value::Array(items) => items,
            other => vec![other],
        };

        match results.len() {
            0 => Ok(Value::Null),
            1 => Ok(Value::from_json(results.into_iter().next().unwrap())),
            _ => Ok(Value::List(results.into_iter().map(Value::from_json).collect())),
        }
    }
}

impl Resolver for JsonPathResolver {
    fn name(&self) -> &str {
        "jsonpath"
    }

    fn resolve(&self, segments: &[PathSegment], context: &Context, span: Span) -> Result<Value> {
        let query = Self::path_to_query(segments);
        Self::run_query(&query, context, span)
    }

    fn resolve_raw(&self, text: &str, context: &Context, span: Span) -> Result<Value> {
        Self::run_query(text, context, span)
    }

    fn supports_raw(&self) -> bool {
        true
    }
}
