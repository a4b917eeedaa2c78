//! Numeric coercion and ordering rules.

use std::cmp::Ordering;

use crate::error::{DilemmaError, Result};
use crate::model::value::Value;
use crate::span::Span;

/// The result of promoting two numeric operands to a common representation.
pub enum Numeric {
    /// Both operands were integers.
    Ints(i64, i64),
    /// At least one operand was a float; both are promoted to float.
    Floats(f64, f64),
}

/// Promote two values to a common numeric representation, or raise a type
/// error if either operand isn't a number.
pub fn promote_numeric(left: &Value, right: &Value, op: &str, span: Span) -> Result<Numeric> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Numeric::Ints(*a, *b)),
        (l, r) if l.is_numeric() && r.is_numeric() => {
            Ok(Numeric::Floats(l.as_f64().unwrap(), r.as_f64().unwrap()))
        }
        (l, r) => Err(DilemmaError::type_error(
            format!(
                "cannot apply '{op}' to {} and {}",
                l.kind_name(),
                r.kind_name()
            ),
            span,
        )),
    }
}

/// Order two values: defined only for numeric pairs and for
/// string pairs (lexicographic); anything else is a type error.
pub fn compare_ordered(left: &Value, right: &Value, op: &str, span: Span) -> Result<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(a.as_ref().cmp(b.as_ref())),
        (l, r) if l.is_numeric() && r.is_numeric() => {
            let a = l.as_f64().unwrap();
            let b = r.as_f64().unwrap();
            a.partial_cmp(&b).ok_or_else(|| {
                DilemmaError::type_error(format!("cannot order NaN with '{op}'"), span)
            })
        }
        (l, r) => Err(DilemmaError::type_error(
            format!(
                "cannot order {} and {} with '{op}'",
                l.kind_name(),
                r.kind_name()
            ),
            span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotes_mixed_int_float_to_floats() {
        let n = promote_numeric(&Value::Int(2), &Value::Float(1.5), "+", Span::new(0, 0)).unwrap();
        match n {
            Numeric::Floats(a, b) => {
                assert_eq!(a, 2.0);
                assert_eq!(b, 1.5);
            }
            Numeric::Ints(..) => panic!("expected float promotion"),
        }
    }

    #[test]
    fn rejects_non_numeric_operands() {
        let err = promote_numeric(&Value::Bool(true), &Value::Int(1), "+", Span::new(0, 0));
        assert!(err.is_err());
    }

    #[test]
    fn orders_strings_lexicographically() {
        let ord = compare_ordered(
            &Value::string("abc"),
            &Value::string("abd"),
            "<",
            Span::new(0, 0),
        )
        .unwrap();
        assert_eq!(ord, Ordering::Less);
    }

    #[test]
    fn ordering_booleans_is_a_type_error() {
        let err = compare_ordered(&Value::Bool(true), &Value::Bool(false), "<", Span::new(0, 0));
        assert!(err.is_err());
    }
}
