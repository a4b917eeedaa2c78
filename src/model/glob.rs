//! Glob-to-regex translation for the `like` operator.
//!
//! `like` is case-insensitive, anchored at both ends, with `*` matching any
//! run of characters and `?` matching exactly one character. Translating to
//! `regex` (already a dependency for other pattern needs) is simpler and
//! more predictable than hand-rolling a matcher.

use regex::Regex;

use crate::error::{DilemmaError, Result};
use crate::span::Span;

/// Compile a `like` glob pattern into an anchored, case-insensitive regex.
pub fn compile_like_pattern(glob: &str, span: Span) -> Result<Regex> {
    let mut pattern = String::with_capacity(glob.len() * 2 + 8);
    pattern.push_str("(?is)^");
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => {
                if is_regex_meta(ch) {
                    pattern.push('\\');
                }
                pattern.push(ch);
            }
        }
    }
    pattern.push('$');

    Regex::new(&pattern)
        .map_err(|e| DilemmaError::type_error(format!("invalid 'like' pattern: {e}"), span))
}

fn is_regex_meta(ch: char) -> bool {
    matches!(
        ch,
        '.' | '+'
            | '('
            | ')'
            | '|'
            | '['
            | ']'
            | '{'
            | '}'
            | '^'
            | '$'
            | '\\'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_run_case_insensitively() {
        let re = compile_like_pattern("*.txt", Span::new(0, 0)).unwrap();
        assert!(re.is_match("Hello.TXT"));
        assert!(!re.is_match("Hello.txtx"));
    }

    #[test]
    fn question_mark_matches_exactly_one_char() {
        let re = compile_like_pattern("a?c", Span::new(0, 0)).unwrap();
        assert!(re.is_match("abc"));
        assert!(!re.is_match("abbc"));
    }

    #[test]
    fn literal_regex_metacharacters_are_escaped() {
        let re = compile_like_pattern("3.14", Span::new(0, 0)).unwrap();
        assert!(re.is_match("3.14"));
        assert!(!re.is_match("3x14"));
    }
}
