//! Property-level checks for parsing, compilation, and evaluation
//! invariants.
//!
//! These are hand-written assertions rather than a `proptest`/`quickcheck`
//! harness: the grammar is small and finite enough that a handful of
//! representative expressions cover each invariant without needing a
//! generator and shrinker on top.

use dilemma::{clear_cache, compile, evaluate, parse, pretty, Now, Value};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

const SAMPLE_EXPRESSIONS: &[&str] = &[
    "1 + 2 * 3",
    "'a' in list",
    "profile.age >= 18 and profile.age < 65",
    "name like '*Corp'",
    "seenAt is $past",
    "not a == b or c",
];

/// Parsing the same source string twice always produces the same AST: the
/// parser has no hidden state that would make it drift between calls.
#[test]
fn parsing_is_deterministic() {
    for source in SAMPLE_EXPRESSIONS {
        let first = parse(source).unwrap();
        let second = parse(source).unwrap();
        assert_eq!(first, second, "parse({source:?}) was not deterministic");
    }
}

/// Re-parsing a pretty-printed expression yields the same AST as parsing the
/// original source: `parse(pretty(parse(s))) == parse(s)`. The pretty-printer
/// fully parenthesizes every compound node precisely so this holds regardless
/// of precedence or the original source's own parenthesization.
#[test]
fn pretty_printing_round_trips_through_the_parser() {
    for source in SAMPLE_EXPRESSIONS {
        let original = parse(source).unwrap();
        let rendered = pretty(&original);
        let reparsed = parse(&rendered).unwrap();
        assert_eq!(
            reparsed, original,
            "parse(pretty(parse({source:?}))) != parse({source:?}); pretty-printed as {rendered:?}"
        );
    }
}

/// Compiling the same source twice yields an AST that evaluates identically
/// to a direct (uncached) parse-and-evaluate, regardless of which one ran
/// first or whether the cache was warm.
#[test]
fn compiling_is_idempotent_with_respect_to_evaluation() {
    clear_cache();
    let context = IndexMap::new();
    let source = "2 * (3 + 4)";

    let direct = evaluate(source, &context).unwrap();
    let compiled_first = compile(source).unwrap().evaluate(&context).unwrap();
    let compiled_second = compile(source).unwrap().evaluate(&context).unwrap();

    assert_eq!(direct, compiled_first);
    assert_eq!(compiled_first, compiled_second);
}

/// `and`/`or` never evaluate their right-hand side once the left side has
/// already decided the result — a right side that would error (division by
/// zero) must not surface that error when short-circuited away.
#[test]
fn short_circuit_evaluation_never_touches_the_discarded_side() {
    let context = IndexMap::new();
    assert_eq!(evaluate("false and (1 / 0 == 0)", &context).unwrap(), Value::Bool(false));
    assert_eq!(evaluate("true or (1 / 0 == 0)", &context).unwrap(), Value::Bool(true));
}

/// A missing path segment resolves to `Null` rather than raising an error;
/// only once that `Null` is used somewhere that demands a concrete type
/// (arithmetic, `like`, a time window) does evaluation fail.
#[test]
fn missing_path_segments_propagate_as_null_not_errors() {
    let context: IndexMap<String, Value> = IndexMap::new();
    assert_eq!(evaluate("missing.nested.field", &context).unwrap(), Value::Null);
    assert_eq!(evaluate("missing.nested.field is $empty", &context).unwrap(), Value::Bool(true));
    assert!(evaluate("missing.nested.field + 1", &context).is_err());
}

/// Within a single evaluation call, every reference to `$now`/`$today`
/// observes the same captured instant, no matter how many times it's used.
#[test]
fn now_is_captured_once_per_evaluation() {
    let now = Now::at(chrono::Utc::now());
    let context: IndexMap<String, Value> = IndexMap::new();
    let compiled = compile("$now == $now and $today == $today").unwrap();
    assert_eq!(compiled.evaluate_at(&context, now).unwrap(), Value::Bool(true));
}

/// `x in list` and `list contains x` are the same relation read from
/// opposite ends and must always agree.
#[test]
fn membership_and_contains_are_commutative_readings_of_the_same_relation() {
    let mut context = IndexMap::new();
    context.insert(
        "roles".to_string(),
        Value::List(vec![Value::string("admin"), Value::string("editor")]),
    );

    for (needle, expected) in [("admin", true), ("editor", true), ("guest", false)] {
        let in_result = evaluate(&format!("'{needle}' in roles"), &context).unwrap();
        let contains_result = evaluate(&format!("roles contains '{needle}'"), &context).unwrap();
        assert_eq!(in_result, Value::Bool(expected));
        assert_eq!(in_result, contains_result);
    }
}
