//! Tree-walking evaluation of a parsed [`Expr`] against a [`Context`].

mod operators;

use crate::ast::{BinaryOperator, Expr, IsRhs, LiteralValue, PathSegment, Sentinel, UnaryOperator, WindowDirection};
use crate::error::{DilemmaError, Result};
use crate::model::{coerce_to_instant, Context, Now, Value};
use crate::registry;
use crate::span::Span;

/// Evaluates one [`Expr`] tree against a [`Context`], capturing "now" once so
/// every `$now`/`$today`/`is $past` within the same call observes a single
/// consistent instant.
pub struct Evaluator<'ctx> {
    context: &'ctx Context,
    now: Now,
}

impl<'ctx> Evaluator<'ctx> {
    /// Create an evaluator that captures the current wall-clock instant.
    pub fn new(context: &'ctx Context) -> Self {
        Self {
            context,
            now: Now::capture(),
        }
    }

    /// Create an evaluator pinned to a fixed instant, for deterministic
    /// tests and reproducible audit trails.
    pub fn with_now(context: &'ctx Context, now: Now) -> Self {
        Self { context, now }
    }

    /// Evaluate a top-level expression.
    pub fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal { value, span } => self.eval_literal(value, *span),
            Expr::Path { segments, span } => self.eval_path(segments, *span),
            Expr::RawPath {
                text,
                resolver_hint,
                span,
            } => self.eval_raw_path(text, resolver_hint.as_deref(), *span),
            Expr::BinaryOp { op, left, right, span } => self.eval_binary(*op, left, right, *span),
            Expr::UnaryOp { op, operand, span } => self.eval_unary(*op, operand, *span),
            Expr::IsCheck { subject, rhs, span } => self.eval_is(subject, rhs, *span),
            Expr::TimeWindow {
                subject,
                quantity,
                unit,
                direction,
                span,
            } => self.eval_time_window(subject, quantity, *unit, *direction, *span),
        }
    }

    fn eval_literal(&self, value: &LiteralValue, span: Span) -> Result<Value> {
        match value {
            LiteralValue::Integer(n) => Ok(Value::Int(*n)),
            LiteralValue::Float(f) => Ok(Value::Float(*f)),
            LiteralValue::String(s) => Ok(Value::string(s.clone())),
            LiteralValue::Boolean(b) => Ok(Value::Bool(*b)),
            LiteralValue::Sentinel(tag) => self.eval_sentinel_value(*tag, span),
        }
    }

    fn eval_sentinel_value(&self, tag: Sentinel, span: Span) -> Result<Value> {
        match tag {
            Sentinel::Now => Ok(Value::DateTime(self.now.0)),
            Sentinel::Today => Ok(Value::DateTime(self.now.today_midnight())),
            Sentinel::Empty => Ok(Value::Null),
            Sentinel::Past => Err(DilemmaError::type_error(
                "'$past' has no standalone value; it can only appear on the right-hand side of 'is'",
                span,
            )),
            Sentinel::Future => Err(DilemmaError::type_error(
                "'$future' has no standalone value; it can only appear on the right-hand side of 'is'",
                span,
            )),
        }
    }

    fn eval_path(&self, segments: &[PathSegment], span: Span) -> Result<Value> {
        let resolver = registry::default_resolver().ok_or_else(|| {
            DilemmaError::resolver("no resolver is registered to evaluate a path", span)
        })?;
        resolver.resolve(segments, self.context, span)
    }

    fn eval_raw_path(&self, text: &str, hint: Option<&str>, span: Span) -> Result<Value> {
        let resolver = match hint {
            Some(name) => registry::resolver_by_name(name).ok_or_else(|| {
                DilemmaError::resolver(format!("no resolver registered under the name '{name}'"), span)
            })?,
            None => registry::default_resolver().ok_or_else(|| {
                DilemmaError::resolver("no resolver is registered to evaluate a raw query", span)
            })?,
        };
        resolver.resolve_raw(text, self.context, span)
    }

    fn eval_binary(&self, op: BinaryOperator, left: &Expr, right: &Expr, span: Span) -> Result<Value> {
        if op.is_short_circuit() {
            let left_value = self.eval(left)?;
            let left_truthy = left_value.is_truthy();
            if op == BinaryOperator::And && !left_truthy {
                return Ok(Value::Bool(false));
            }
            if op == BinaryOperator::Or && left_truthy {
                return Ok(Value::Bool(true));
            }
            let right_value = self.eval(right)?;
            return Ok(Value::Bool(right_value.is_truthy()));
        }

        let left_value = self.eval(left)?;
        let right_value = self.eval(right)?;
        operators::apply(op, left_value, right_value, span)
    }

    fn eval_unary(&self, op: UnaryOperator, operand: &Expr, span: Span) -> Result<Value> {
        let value = self.eval(operand)?;
        match op {
            UnaryOperator::Not => Ok(Value::Bool(!value.is_truthy())),
            UnaryOperator::Negate => match value {
                Value::Int(n) => Ok(Value::Int(-n)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(DilemmaError::type_error(
                    format!("cannot negate a {}", other.kind_name()),
                    span,
                )),
            },
        }
    }

    fn eval_is(&self, subject: &Expr, rhs: &IsRhs, span: Span) -> Result<Value> {
        let subject_value = self.eval(subject)?;
        match rhs {
            IsRhs::Sentinel(Sentinel::Empty) => Ok(Value::Bool(subject_value.is_empty_value())),
            IsRhs::Sentinel(Sentinel::Past) => {
                let instant = coerce_to_instant(&subject_value, span)?;
                Ok(Value::Bool(instant < self.now.0))
            }
            IsRhs::Sentinel(Sentinel::Future) => {
                let instant = coerce_to_instant(&subject_value, span)?;
                Ok(Value::Bool(instant > self.now.0))
            }
            IsRhs::Sentinel(Sentinel::Today) => {
                let instant = coerce_to_instant(&subject_value, span)?;
                Ok(Value::Bool(crate::model::same_calendar_day(instant, self.now.0)))
            }
            IsRhs::Sentinel(Sentinel::Now) => {
                let rhs_value = self.eval_sentinel_value(Sentinel::Now, span)?;
                Ok(Value::Bool(subject_value == rhs_value))
            }
            IsRhs::Expr(expr) => {
                let rhs_value = self.eval(expr)?;
                Ok(Value::Bool(subject_value == rhs_value))
            }
        }
    }

    fn eval_time_window(
        &self,
        subject: &Expr,
        quantity: &Expr,
        unit: crate::ast::TimeUnit,
        direction: WindowDirection,
        span: Span,
    ) -> Result<Value> {
        let subject_value = self.eval(subject)?;
        let instant = coerce_to_instant(&subject_value, span)?;

        let quantity_value = self.eval(quantity)?;
        let quantity = quantity_value.as_f64().ok_or_else(|| {
            DilemmaError::type_error(
                format!(
                    "a time-window quantity must be a number, got {}",
                    quantity_value.kind_name()
                ),
                span,
            )
        })?;
        let threshold_seconds = quantity * unit.as_seconds() as f64;

        let elapsed_seconds = (self.now.0 - instant).num_seconds() as f64;

        let within = elapsed_seconds.abs() <= threshold_seconds;
        match direction {
            WindowDirection::Within => Ok(Value::Bool(within)),
            WindowDirection::OlderThan => Ok(Value::Bool(elapsed_seconds > threshold_seconds)),
        }
    }
}

/// Evaluate `expr` against `context`, capturing "now" for this call.
pub fn evaluate(expr: &Expr, context: &Context) -> Result<Value> {
    Evaluator::new(context).eval(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Now;
    use crate::parser::parse;
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;

    fn eval_str(source: &str, context: &Context) -> Result<Value> {
        let expr = parse(source).unwrap();
        evaluate(&expr, context)
    }

    #[test]
    fn evaluates_arithmetic() {
        let context = Context::new();
        assert_eq!(eval_str("2 * (3 + 4)", &context).unwrap(), Value::Int(14));
    }

    #[test]
    fn evaluates_like_operator() {
        let context = Context::new();
        assert_eq!(
            eval_str("'Hello.TXT' like '*.txt'", &context).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn evaluates_path_against_context() {
        let mut context = IndexMap::new();
        let mut profile = IndexMap::new();
        profile.insert("age".to_string(), Value::Int(42));
        context.insert("profile".to_string(), Value::Map(profile));
        assert_eq!(eval_str("profile.age", &context).unwrap(), Value::Int(42));
    }

    #[test]
    fn and_short_circuits_without_evaluating_right_side() {
        let context = Context::new();
        // missing.path would resolve to Null via the basic resolver, not error,
        // so this also exercises that `false and <anything>` never touches it.
        assert_eq!(
            eval_str("false and (1 / 0 == 0)", &context).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn or_short_circuits_without_evaluating_right_side() {
        let context = Context::new();
        assert_eq!(
            eval_str("true or (1 / 0 == 0)", &context).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn is_empty_checks_emptiness_not_truthiness() {
        let mut context = IndexMap::new();
        context.insert("count".to_string(), Value::Int(0));
        assert_eq!(eval_str("count is $empty", &context).unwrap(), Value::Bool(false));
    }

    #[test]
    fn older_than_uses_fixed_week_length() {
        let now = Now::at(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        let mut context = IndexMap::new();
        context.insert(
            "seenAt".to_string(),
            Value::string("2024-01-07T01:00:00Z"), // 7 days + 1 hour before `now`
        );
        let expr = parse("seenAt older than 1 week").unwrap();
        let evaluator = Evaluator::with_now(&context, now);
        assert_eq!(evaluator.eval(&expr).unwrap(), Value::Bool(true));
    }

    #[test]
    fn within_uses_absolute_distance_from_now() {
        let now = Now::at(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        let mut context = IndexMap::new();
        context.insert("seenAt".to_string(), Value::string("2024-01-14T00:00:00Z"));
        let expr = parse("seenAt within 2 days").unwrap();
        let evaluator = Evaluator::with_now(&context, now);
        assert_eq!(evaluator.eval(&expr).unwrap(), Value::Bool(true));
    }

    #[test]
    fn membership_and_contains_on_roles_list() {
        let mut context = IndexMap::new();
        context.insert(
            "roles".to_string(),
            Value::List(vec![Value::string("admin"), Value::string("editor")]),
        );
        assert_eq!(eval_str("'admin' in roles", &context).unwrap(), Value::Bool(true));
        assert_eq!(
            eval_str("roles contains 'editor'", &context).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn division_by_zero_is_a_dilemma_error() {
        let context = Context::new();
        let err = eval_str("1 / 0", &context).unwrap_err();
        assert!(matches!(err, DilemmaError::DivisionByZero { .. }));
    }
}
