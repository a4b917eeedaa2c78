//! Binary operator semantics.

use std::cmp::Ordering;

use crate::ast::BinaryOperator;
use crate::error::{DilemmaError, Result};
use crate::model::{coerce_to_instant, compare_ordered, promote_numeric, same_calendar_day, Numeric, Value};
use crate::model::compile_like_pattern;
use crate::span::Span;

/// Apply a non-short-circuiting binary operator to two already-evaluated
/// operands. `And`/`Or` are handled by the caller, since they must not
/// evaluate their right operand eagerly.
pub fn apply(op: BinaryOperator, left: Value, right: Value, span: Span) -> Result<Value> {
    match op {
        BinaryOperator::Add => arithmetic(op, left, right, span, |a, b| a + b, |a, b| a.checked_add(b)),
        BinaryOperator::Subtract => {
            arithmetic(op, left, right, span, |a, b| a - b, |a, b| a.checked_sub(b))
        }
        BinaryOperator::Multiply => {
            arithmetic(op, left, right, span, |a, b| a * b, |a, b| a.checked_mul(b))
        }
        BinaryOperator::Divide => divide(left, right, span),

        BinaryOperator::Equal => Ok(Value::Bool(left == right)),
        BinaryOperator::NotEqual => Ok(Value::Bool(left != right)),

        BinaryOperator::LessThan => ordering(left, right, op, span, |o| o == Ordering::Less),
        BinaryOperator::LessThanOrEqual => {
            ordering(left, right, op, span, |o| o != Ordering::Greater)
        }
        BinaryOperator::GreaterThan => ordering(left, right, op, span, |o| o == Ordering::Greater),
        BinaryOperator::GreaterThanOrEqual => {
            ordering(left, right, op, span, |o| o != Ordering::Less)
        }

        BinaryOperator::In => membership(left, right, span),
        BinaryOperator::Contains => membership(right, left, span),
        BinaryOperator::Like => like(left, right, span),

        BinaryOperator::Before => date_compare(left, right, span, |a, b| a < b),
        BinaryOperator::After => date_compare(left, right, span, |a, b| a > b),
        BinaryOperator::SameDayAs => date_compare(left, right, span, same_calendar_day),

        BinaryOperator::And | BinaryOperator::Or => {
            unreachable!("short-circuit operators are handled by the caller")
        }
    }
}

fn arithmetic(
    op: BinaryOperator,
    left: Value,
    right: Value,
    span: Span,
    float_op: impl Fn(f64, f64) -> f64,
    int_op: impl Fn(i64, i64) -> Option<i64>,
) -> Result<Value> {
    match promote_numeric(&left, &right, op.symbol(), span)? {
        Numeric::Ints(a, b) => int_op(a, b)
            .map(Value::Int)
            .ok_or_else(|| DilemmaError::type_error(format!("integer overflow in '{op}'"), span)),
        Numeric::Floats(a, b) => Ok(Value::Float(float_op(a, b))),
    }
}

fn divide(left: Value, right: Value, span: Span) -> Result<Value> {
    match promote_numeric(&left, &right, "/", span)? {
        Numeric::Ints(_, 0) => Err(DilemmaError::DivisionByZero { span }),
        // True division: stay an integer only when it divides exactly,
        // otherwise fall through to a float result.
        Numeric::Ints(a, b) if a % b == 0 => Ok(Value::Int(a / b)),
        Numeric::Ints(a, b) => Ok(Value::Float(a as f64 / b as f64)),
        Numeric::Floats(_, b) if b == 0.0 => Err(DilemmaError::DivisionByZero { span }),
        Numeric::Floats(a, b) => Ok(Value::Float(a / b)),
    }
}

fn ordering(
    left: Value,
    right: Value,
    op: BinaryOperator,
    span: Span,
    accept: impl Fn(Ordering) -> bool,
) -> Result<Value> {
    let ord = compare_ordered(&left, &right, op.symbol(), span)?;
    Ok(Value::Bool(accept(ord)))
}

fn membership(needle: Value, haystack: Value, span: Span) -> Result<Value> {
    match haystack {
        Value::List(items) => Ok(Value::Bool(items.iter().any(|item| *item == needle))),
        Value::Map(map) => match needle {
            Value::Str(key) => Ok(Value::Bool(map.contains_key(key.as_ref()))),
            other => Err(DilemmaError::type_error(
                format!("cannot use a {} as a mapping key for 'in'", other.kind_name()),
                span,
            )),
        },
        Value::Str(haystack) => match needle {
            Value::Str(needle) => Ok(Value::Bool(haystack.contains(needle.as_ref()))),
            other => Err(DilemmaError::type_error(
                format!("cannot check a {} for substring membership", other.kind_name()),
                span,
            )),
        },
        other => Err(DilemmaError::type_error(
            format!("'in'/'contains' is not supported on a {}", other.kind_name()),
            span,
        )),
    }
}

fn like(left: Value, right: Value, span: Span) -> Result<Value> {
    let (Value::Str(subject), Value::Str(pattern)) = (&left, &right) else {
        return Err(DilemmaError::type_error(
            format!(
                "'like' requires two strings, got {} and {}",
                left.kind_name(),
                right.kind_name()
            ),
            span,
        ));
    };
    let regex = compile_like_pattern(pattern, span)?;
    Ok(Value::Bool(regex.is_match(subject)))
}

fn date_compare(
    left: Value,
    right: Value,
    span: Span,
    accept: impl Fn(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) -> bool,
) -> Result<Value> {
    let a = coerce_to_instant(&left, span)?;
    let b = coerce_to_instant(&right, span)?;
    Ok(Value::Bool(accept(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_integers() {
        let result = apply(BinaryOperator::Add, Value::Int(2), Value::Int(3), Span::new(0, 0)).unwrap();
        assert_eq!(result, Value::Int(5));
    }

    #[test]
    fn mixed_int_float_addition_promotes_to_float() {
        let result = apply(BinaryOperator::Add, Value::Int(2), Value::Float(0.5), Span::new(0, 0)).unwrap();
        assert_eq!(result, Value::Float(2.5));
    }

    #[test]
    fn exact_integer_division_stays_an_integer() {
        let result = apply(BinaryOperator::Divide, Value::Int(6), Value::Int(3), Span::new(0, 0)).unwrap();
        assert_eq!(result, Value::Int(2));
    }

    #[test]
    fn inexact_integer_division_promotes_to_float() {
        let result = apply(BinaryOperator::Divide, Value::Int(7), Value::Int(2), Span::new(0, 0)).unwrap();
        assert_eq!(result, Value::Float(3.5));
    }

    #[test]
    fn integer_division_by_zero_is_an_error() {
        let result = apply(BinaryOperator::Divide, Value::Int(1), Value::Int(0), Span::new(0, 0));
        assert!(matches!(result, Err(DilemmaError::DivisionByZero { .. })));
    }

    #[test]
    fn membership_checks_list_contents() {
        let haystack = Value::List(vec![Value::string("admin"), Value::string("editor")]);
        let result = apply(
            BinaryOperator::In,
            Value::string("admin"),
            haystack,
            Span::new(0, 0),
        )
        .unwrap();
        assert_eq!(result, Value::Bool(true));
    }

    #[test]
    fn contains_is_membership_with_swapped_operands() {
        let haystack = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let result = apply(BinaryOperator::Contains, haystack, Value::Int(2), Span::new(0, 0)).unwrap();
        assert_eq!(result, Value::Bool(true));
    }

    #[test]
    fn like_matches_glob_case_insensitively() {
        let result = apply(
            BinaryOperator::Like,
            Value::string("Hello.TXT"),
            Value::string("*.txt"),
            Span::new(0, 0),
        )
        .unwrap();
        assert_eq!(result, Value::Bool(true));
    }

    #[test]
    fn equal_uses_cross_kind_rules() {
        let result = apply(BinaryOperator::Equal, Value::Int(3), Value::Float(3.0), Span::new(0, 0)).unwrap();
        assert_eq!(result, Value::Bool(true));
    }
}
