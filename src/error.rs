//! Structured error types for parsing and evaluation.
//!
//! Every error surfaces one of the five categories from the error handling
//! design: [`DilemmaError::Parse`], [`DilemmaError::Type`],
//! [`DilemmaError::Resolver`], [`DilemmaError::DivisionByZero`], and
//! [`DilemmaError::UnknownSentinel`]. Each carries a [`Span`] so callers can
//! point back at the offending source text.

use thiserror::Error;

use crate::span::Span;

/// Result type returned by parsing and evaluation.
pub type Result<T> = std::result::Result<T, DilemmaError>;

/// An error raised while parsing or evaluating a Dilemma expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DilemmaError {
    /// Malformed source text.
    #[error("parse error at {span:?}: {message}")]
    Parse {
        /// Human-readable reason.
        message: String,
        /// Location of the offending token.
        span: Span,
    },

    /// An operator was applied to operand kinds it doesn't support.
    #[error("type error at {span:?}: {message}")]
    Type {
        /// Human-readable reason.
        message: String,
        /// Location of the offending subexpression.
        span: Span,
    },

    /// A resolver could not execute a path or raw query.
    #[error("resolver error at {span:?}: {message}")]
    Resolver {
        /// Human-readable reason.
        message: String,
        /// Location of the offending path/raw expression.
        span: Span,
    },

    /// Arithmetic division (or modulo) by zero.
    #[error("division by zero at {span:?}")]
    DivisionByZero {
        /// Location of the offending division.
        span: Span,
    },

    /// A `$sentinel` token that isn't one of the five recognized sentinels.
    #[error("unknown sentinel '${name}' at {span:?}")]
    UnknownSentinel {
        /// The unrecognized sentinel name (without the leading `$`).
        name: String,
        /// Location of the sentinel token.
        span: Span,
    },
}

impl DilemmaError {
    /// The span this error is anchored to, for caret-style rendering.
    pub fn span(&self) -> Span {
        match self {
            DilemmaError::Parse { span, .. }
            | DilemmaError::Type { span, .. }
            | DilemmaError::Resolver { span, .. }
            | DilemmaError::DivisionByZero { span }
            | DilemmaError::UnknownSentinel { span, .. } => *span,
        }
    }

    /// Render a single-line message plus a caret line pointing at the span
    /// within `source`, for terminal-friendly diagnostics.
    pub fn render(&self, source: &str) -> String {
        let span = self.span();
        let (line, col) = span.line_col(source);
        let line_text = source.lines().nth(line - 1).unwrap_or("");
        let caret = " ".repeat(col.saturating_sub(1)) + "^";
        format!("{self}\n  --> line {line}, column {col}\n  {line_text}\n  {caret}")
    }

    pub(crate) fn parse(message: impl Into<String>, span: Span) -> Self {
        DilemmaError::Parse {
            message: message.into(),
            span,
        }
    }

    pub(crate) fn type_error(message: impl Into<String>, span: Span) -> Self {
        DilemmaError::Type {
            message: message.into(),
            span,
        }
    }

    pub(crate) fn resolver(message: impl Into<String>, span: Span) -> Self {
        DilemmaError::Resolver {
            message: message.into(),
            span,
        }
    }

    pub(crate) fn unknown_sentinel(name: impl Into<String>, span: Span) -> Self {
        DilemmaError::UnknownSentinel {
            name: name.into(),
            span,
        }
    }
}
