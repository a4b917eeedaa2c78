//! Source span tracking for parse errors and diagnostics.

/// A byte-offset range into the original source string.
///
/// Spans are 0-based half-open ranges internally; [`Span::line_col`] converts
/// the start offset into a 1-based line/column pair for error messages, since
/// the public error contract reports 1-based positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start offset, inclusive.
    pub start: usize,
    /// End offset, exclusive.
    pub end: usize,
}

impl Span {
    /// Create a new span from a byte offset range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span at a single offset, used for end-of-input errors.
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Merge two spans into the smallest span covering both.
    pub fn join(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Convert the start offset into a 1-based (line, column) pair.
    pub fn line_col(self, source: &str) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for ch in source[..self.start.min(source.len())].chars() {
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}
