//! Two-stage compile/evaluate with a small process-wide AST cache.
//!
//! One shared map, no TTL, no eviction policy, no per-entry
//! statistics. Expressions are normally small and the caller is expected to
//! decide for itself when to stop holding on to a [`CompiledExpression`];
//! the cache here exists only to avoid re-parsing the same literal source
//! string across repeated [`evaluate`] calls.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::ast::Expr;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::model::{Context, Now, Value};
use crate::parser;

static CACHE: Lazy<DashMap<String, Arc<Expr>>> = Lazy::new(DashMap::new);

/// A parsed expression, ready to evaluate against any number of contexts
/// without re-parsing.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    expr: Arc<Expr>,
}

impl CompiledExpression {
    /// The parsed AST, for callers that want to inspect or re-use it
    /// directly (e.g. a custom evaluator wrapper).
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against `context`, capturing "now" for this call.
    pub fn evaluate(&self, context: &Context) -> Result<Value> {
        Evaluator::new(context).eval(&self.expr)
    }

    /// Evaluate against `context` using a caller-supplied instant, for
    /// deterministic tests and reproducible audit trails.
    pub fn evaluate_at(&self, context: &Context, now: Now) -> Result<Value> {
        Evaluator::with_now(context, now).eval(&self.expr)
    }
}

/// Parse `source` into a [`CompiledExpression`], reusing a cached AST if
/// this exact source string has been compiled before in this process.
pub fn compile(source: &str) -> Result<CompiledExpression> {
    if let Some(cached) = CACHE.get(source) {
        return Ok(CompiledExpression {
            expr: Arc::clone(cached.value()),
        });
    }

    let expr = Arc::new(parser::parse(source)?);
    CACHE.insert(source.to_string(), Arc::clone(&expr));
    Ok(CompiledExpression { expr })
}

/// Drop every cached compiled expression. Exposed mainly for tests and for
/// long-running processes that want to bound cache growth explicitly.
pub fn clear_cache() {
    CACHE.clear();
}
