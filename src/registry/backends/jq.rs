//! A resolver backed by the `jaq` JQ-filter interpreter.
//!
//! Gated behind the `jq` feature and probed once at registry bootstrap:
//! compiling and running a trivial filter confirms the interpreter actually
//! initializes in this process before it's offered as the default resolver.

use jaq_core::load::{Arena, File, Loader};
use jaq_core::{Ctx, RcIter};
use jaq_json::Val;

use crate::ast::PathSegment;
use crate::error::{DilemmaError, Result};
use crate::model::{Context, Value};
use crate::registry::resolver::Resolver;
use crate::span::Span;

/// Resolver backed by `jaq-core`/`jaq-std`/`jaq-json`.
pub struct JqResolver;

impl JqResolver {
    /// Compile and run a trivial filter to confirm the interpreter
    /// initializes cleanly in this process.
    pub fn probe() -> std::result::Result<Self, String> {
        let resolver = JqResolver;
        resolver.run_filter(".", &serde_json::Value::Null)?;
        Ok(resolver)
    }

    fn path_to_filter(segments: &[PathSegment]) -> String {
        let mut filter = String::from(".");
        for segment in segments {
            match segment {
                PathSegment::Name(name) => {
                    if !filter.ends_with('.') {
                        filter.push('.');
                    }
                    filter.push_str(name);
                }
                PathSegment::Index(index) => {
                    filter.push('[');
                    filter.push_str(&index.to_string());
                    filter.push(']');
                }
            }
        }
        filter
    }

    fn run_filter(
        &self,
        filter_src: &str,
        input: &serde_json::Value,
    ) -> std::result::Result<Vec<serde_json::Value>, String> {
        let program = File {
            code: filter_src,
            path: (),
        };
        let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
        let arena = Arena::default();
        let modules = loader
            .load(&arena, program)
            .map_err(|errs| format!("failed to load jq filter '{filter_src}': {errs:?}"))?;
        let filter = jaq_core::Compiler::default()
            .with_funs(jaq_std::funs().chain(jaq_json::funs()))
            .compile(modules)
            .map_err(|errs| format!("failed to compile jq filter '{filter_src}': {errs:?}"))?;

        let inputs = RcIter::new(core::iter::empty());
        let ctx = Ctx::new([], &inputs);
        let value = Val::from(input.clone());

        filter
            .run((ctx, value))
            .map(|result| {
                result
                    .map(serde_json::Value::from)
                    .map_err(|e| format!("jq evaluation error in '{filter_src}': {e:?}"))
            })
            .collect::<std::result::Result<Vec<_>, String>>()
    }

    fn results_to_value(
        results: std::result::Result<Vec<serde_json::Value>, String>,
        span: Span,
    ) -> Result<Value> {
        let results = results.map_err(|message| DilemmaError::resolver(message, span))?;
        match results.len() {
            0 => Ok(Value::Null),
            1 => Ok(Value::from_json(results.into_iter().next().unwrap())),
            _ => Ok(Value::List(results.into_iter().map(Value::from_json).collect())),
        }
    }
}

impl Resolver for JqResolver {
    fn name(&self) -> &str {
        "jq"
    }

    fn resolve(&self, segments: &[PathSegment], context: &Context, span: Span) -> Result<Value> {
        let filter = Self::path_to_filter(segments);
        let input = Value::Map(context.clone()).to_json();
        Self::results_to_value(self.run_filter(&filter, &input), span)
    }

    fn resolve_raw(&self, text: &str, context: &Context, span: Span) -> Result<Value> {
        let input = Value::Map(context.clone()).to_json();
        Self::results_to_value(self.run_filter(text, &input), span)
    }

    fn supports_raw(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_translate_to_a_jq_filter() {
        let segments = vec![
            PathSegment::Name("user".to_string()),
            PathSegment::Name("name".to_string()),
        ];
        assert_eq!(JqResolver::path_to_filter(&segments), ".user.name");
    }

    #[test]
    fn probe_succeeds_when_the_interpreter_initializes() {
        assert!(JqResolver::probe().is_ok());
    }

    #[test]
    fn runs_a_raw_filter_against_json_input() {
        let resolver = JqResolver;
        let input = serde_json::json!({"user": {"roles": ["admin", "editor"]}});
        let results = resolver.run_filter(".user.roles[0]", &input).unwrap();
        assert_eq!(results, vec![serde_json::json!("admin")]);
    }
}
