//! Hand-written lexer for the Dilemma expression grammar.
//!
//! Identifiers and the embedded backtick raw block are zero-copy slices of
//! the input; string literals are decoded into an owned `String` because
//! escape processing can change their length. Keyword recognition uses a
//! compile-time perfect hash map for O(1) keyword lookup.

use phf::phf_map;
use unicode_xid::UnicodeXID;

use crate::ast::Sentinel;
use crate::error::{DilemmaError, Result};
use crate::span::Span;

/// A lexical token, tagged with the byte span it was scanned from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'input> {
    /// The token kind.
    pub token: Token<'input>,
    /// Its source span.
    pub span: Span,
}

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    /// An integer literal.
    Integer(i64),
    /// A decimal literal.
    Float(f64),
    /// A decoded string literal (escapes already processed).
    Str(String),
    /// An identifier (path segment or time-unit keyword).
    Identifier(&'input str),
    /// A `$past`/`$future`/`$today`/`$now`/`$empty` sentinel.
    Sentinel(Sentinel),
    /// A verbatim backtick sub-expression plus its optional resolver hint.
    Raw {
        /// The raw, uninterpreted text between the backticks.
        text: &'input str,
        /// An `name:` prefix inside the raw block, recognized for backward
        /// compatibility with resolver-qualified raw syntaxes.
        hint: Option<&'input str>,
    },

    /// `true`
    True,
    /// `false`
    False,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `in`
    In,
    /// `contains`
    Contains,
    /// `like`
    Like,
    /// `before`
    Before,
    /// `after`
    After,
    /// `same_day_as`
    SameDayAs,
    /// `within`
    Within,
    /// `older`
    Older,
    /// `than`
    Than,
    /// `is`
    Is,

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `.`
    Dot,

    /// End of input.
    Eof,
}

static KEYWORDS: phf::Map<&'static str, Token<'static>> = phf_map! {
    "true" => Token::True,
    "false" => Token::False,
    "and" => Token::And,
    "or" => Token::Or,
    "not" => Token::Not,
    "in" => Token::In,
    "contains" => Token::Contains,
    "like" => Token::Like,
    "before" => Token::Before,
    "after" => Token::After,
    "same_day_as" => Token::SameDayAs,
    "within" => Token::Within,
    "older" => Token::Older,
    "than" => Token::Than,
    "is" => Token::Is,
};

/// Scans a source string into a vector of spanned tokens.
pub struct Lexer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
}

impl<'input> Lexer<'input> {
    /// Create a new lexer over `input`.
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// Scan the entire input into a token stream, ending with `Token::Eof`.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken<'input>>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.pos;
            if self.pos >= self.bytes.len() {
                tokens.push(SpannedToken {
                    token: Token::Eof,
                    span: Span::at(start),
                });
                break;
            }
            let token = self.next_token()?;
            tokens.push(SpannedToken {
                token,
                span: Span::new(start, self.pos),
            });
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn next_token(&mut self) -> Result<Token<'input>> {
        let start = self.pos;
        let b = self.bytes[self.pos];

        match b {
            b'(' => {
                self.pos += 1;
                Ok(Token::LParen)
            }
            b')' => {
                self.pos += 1;
                Ok(Token::RParen)
            }
            b'[' => {
                self.pos += 1;
                Ok(Token::LBracket)
            }
            b']' => {
                self.pos += 1;
                Ok(Token::RBracket)
            }
            b'.' if !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.pos += 1;
                Ok(Token::Dot)
            }
            b'+' => {
                self.pos += 1;
                Ok(Token::Plus)
            }
            b'-' => {
                self.pos += 1;
                Ok(Token::Minus)
            }
            b'*' => {
                self.pos += 1;
                Ok(Token::Star)
            }
            b'/' => {
                self.pos += 1;
                Ok(Token::Slash)
            }
            b'=' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Ok(Token::EqEq)
            }
            b'!' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Ok(Token::NotEq)
            }
            b'<' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Ok(Token::LtEq)
            }
            b'<' => {
                self.pos += 1;
                Ok(Token::Lt)
            }
            b'>' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Ok(Token::GtEq)
            }
            b'>' => {
                self.pos += 1;
                Ok(Token::Gt)
            }
            b'\'' | b'"' => self.scan_string(b),
            b'`' => self.scan_raw(),
            b'$' => self.scan_sentinel(),
            b'0'..=b'9' => self.scan_number(),
            _ if is_ident_start(b) => self.scan_identifier(),
            _ => Err(DilemmaError::parse(
                format!("unexpected character '{}'", self.char_at(start)),
                Span::new(start, start + 1),
            )),
        }
    }

    fn char_at(&self, byte_pos: usize) -> char {
        self.input[byte_pos..].chars().next().unwrap_or('\u{0}')
    }

    fn scan_number(&mut self) -> Result<Token<'input>> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text = &self.input[start..self.pos];
        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| DilemmaError::parse(format!("invalid number '{text}'"), Span::new(start, self.pos)))
        } else {
            text.parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| DilemmaError::parse(format!("invalid number '{text}'"), Span::new(start, self.pos)))
        }
    }

    fn scan_string(&mut self, quote: u8) -> Result<Token<'input>> {
        let start = self.pos;
        self.pos += 1; // consume opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(DilemmaError::parse(
                        "unterminated string literal",
                        Span::new(start, self.pos),
                    ))
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'n') => {
                            value.push('\n');
                            self.pos += 1;
                        }
                        Some(b't') => {
                            value.push('\t');
                            self.pos += 1;
                        }
                        Some(b'r') => {
                            value.push('\r');
                            self.pos += 1;
                        }
                        Some(b'\\') => {
                            value.push('\\');
                            self.pos += 1;
                        }
                        Some(c) if c == b'\'' || c == b'"' => {
                            value.push(c as char);
                            self.pos += 1;
                        }
                        _ => {
                            return Err(DilemmaError::parse(
                                "invalid escape sequence",
                                Span::new(self.pos, self.pos + 1),
                            ))
                        }
                    }
                }
                Some(_) => {
                    let ch = self.char_at(self.pos);
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        Ok(Token::Str(value))
    }

    /// Scan a backtick-delimited raw sub-expression.
    ///
    /// Nested parentheses/brackets and quoted strings inside the block do
    /// not terminate it; only the matching closing backtick does, and
    /// backticks cannot be escaped inside the block.
    fn scan_raw(&mut self) -> Result<Token<'input>> {
        let open = self.pos;
        self.pos += 1; // consume opening backtick
        let content_start = self.pos;
        let mut in_quote: Option<u8> = None;

        loop {
            match self.peek() {
                None => {
                    return Err(DilemmaError::parse(
                        "unterminated raw `...` block",
                        Span::new(open, self.pos),
                    ))
                }
                Some(b'`') if in_quote.is_none() => break,
                Some(q @ (b'\'' | b'"')) => {
                    match in_quote {
                        Some(active) if active == q => in_quote = None,
                        Some(_) => {}
                        None => in_quote = Some(q),
                    }
                    self.pos += 1;
                }
                Some(_) => {
                    let ch = self.char_at(self.pos);
                    self.pos += ch.len_utf8();
                }
            }
        }

        let content = &self.input[content_start..self.pos];
        self.pos += 1; // consume closing backtick

        Ok(split_raw_hint(content))
    }

    fn scan_sentinel(&mut self) -> Result<Token<'input>> {
        let start = self.pos;
        self.pos += 1; // consume '$'
        let name_start = self.pos;
        while self.peek().is_some_and(|b| is_ident_continue(b)) {
            self.pos += 1;
        }
        let name = &self.input[name_start..self.pos];
        Sentinel::from_name(name)
            .map(Token::Sentinel)
            .ok_or_else(|| DilemmaError::unknown_sentinel(name, Span::new(start, self.pos)))
    }

    fn scan_identifier(&mut self) -> Result<Token<'input>> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let text = &self.input[start..self.pos];
        Ok(KEYWORDS
            .get(text)
            .cloned()
            .unwrap_or(Token::Identifier(text)))
    }
}

fn split_raw_hint(content: &str) -> Token<'_> {
    if let Some(colon) = content.find(':') {
        let (candidate, rest) = content.split_at(colon);
        if !candidate.is_empty()
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Token::Raw {
                text: &rest[1..],
                hint: Some(candidate),
            };
        }
    }
    Token::Raw {
        text: content,
        hint: None,
    }
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || (b.is_ascii() && (b as char).is_xid_start()) || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    b == b'_' || (b.is_ascii() && (b as char).is_xid_continue()) || b >= 0x80
}
