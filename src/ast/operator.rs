//! Operator and unit enumerations shared by the parser and evaluator.

use std::fmt;

/// Binary operators recognized by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `and`
    And,
    /// `or`
    Or,
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
}

impl BinaryOperator {
    /// Whether this operator is one of the arithmetic four.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide
        )
    }

    /// Whether this operator is an equality comparison.
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    /// Whether this operator is a relational ordering comparison.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual
        )
    }

    /// Whether this operator short-circuits its right operand.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Whether this operator requires coercing its operands to instants.
    pub fn is_date_aware(self) -> bool {
        matches!(self, Self::Before | Self::After | Self::SameDayAs)
    }

    /// The textual symbol/keyword for this operator, as it appears in source.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::And => "and",
            Self::Or => "or",
            Self::In => "in",
            Self::Contains => "contains",
            Self::Like => "like",
            Self::Before => "before",
            Self::After => "after",
            Self::SameDayAs => "same_day_as",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary operators recognized by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `not`
    Not,
    /// Unary `-`
    Negate,
}

impl UnaryOperator {
    /// The textual symbol/keyword for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Negate => "-",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Direction of a time-window predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowDirection {
    /// `within`
    Within,
    /// `older than`
    OlderThan,
}

/// Calendar/duration unit used by time-window predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// 60 seconds.
    Minute,
    /// 3600 seconds.
    Hour,
    /// 86400 seconds.
    Day,
    /// 7 days.
    Week,
    /// 30 days (fixed approximation).
    Month,
    /// 365 days (fixed approximation).
    Year,
}

impl TimeUnit {
    /// Fixed-length equivalent in seconds, using the deterministic
    /// approximations month = 30 days, year = 365 days.
    pub fn as_seconds(self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
            Self::Week => 7 * 86_400,
            Self::Month => 30 * 86_400,
            Self::Year => 365 * 86_400,
        }
    }

    /// Parse a unit keyword, accepting both singular and plural spellings.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "minute" | "minutes" => Some(Self::Minute),
            "hour" | "hours" => Some(Self::Hour),
            "day" | "days" => Some(Self::Day),
            "week" | "weeks" => Some(Self::Week),
            "month" | "months" => Some(Self::Month),
            "year" | "years" => Some(Self::Year),
            _ => None,
        }
    }

    /// The plural spelling used when rendering a unit back to source text.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Minute => "minutes",
            Self::Hour => "hours",
            Self::Day => "days",
            Self::Week => "weeks",
            Self::Month => "months",
            Self::Year => "years",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl fmt::Display for WindowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Within => write!(f, "within"),
            Self::OlderThan => write!(f, "older than"),
        }
    }
}

/// Sentinel tags usable both as standalone literals and as the right-hand
/// side of `is`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// `$past`
    Past,
    /// `$future`
    Future,
    /// `$today`
    Today,
    /// `$now`
    Now,
    /// `$empty`
    Empty,
}

impl Sentinel {
    /// Parse a sentinel name (without the leading `$`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "past" => Some(Self::Past),
            "future" => Some(Self::Future),
            "today" => Some(Self::Today),
            "now" => Some(Self::Now),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }

    /// Whether this sentinel is one of `past`/`future`/`today` (i.e. it is
    /// meaningful as the right-hand side of `is`, not just as a value).
    pub fn is_temporal_tag(self) -> bool {
        matches!(self, Self::Past | Self::Future | Self::Today)
    }

    /// The sentinel's name, without the leading `$`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Future => "future",
            Self::Today => "today",
            Self::Now => "now",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name())
    }
}
