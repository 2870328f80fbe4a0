//! Expression tree for free-text query strings.

use std::fmt;

/// Bounds of a range term. `None` or `"*"` means open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Range {
    pub field: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub include_start: bool,
    pub include_end: bool,
}

impl Range {
    /// The lower bound, if it is not open.
    pub fn lower(&self) -> Option<&str> {
        self.start.as_deref().filter(|s| *s != "*")
    }

    /// The upper bound, if it is not open.
    pub fn upper(&self) -> Option<&str> {
        self.end.as_deref().filter(|s| *s != "*")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Term or phrase match. An empty field means "any field".
    Match { field: String, value: String },
    /// Term containing `*` or `?`.
    Wildcard { field: String, value: String },
    /// `/pattern/`
    Regexp { field: String, value: String },
    /// Numeric bounds.
    NumberRange(Range),
    /// Quoted (date-formatted) bounds.
    TimeRange(Range),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn matches(field: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::Match {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn wildcard(field: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::Wildcard {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not(e: Expr) -> Self {
        Expr::Not(Box::new(e))
    }

    pub fn and(l: Expr, r: Expr) -> Self {
        Expr::And(Box::new(l), Box::new(r))
    }

    pub fn or(l: Expr, r: Expr) -> Self {
        Expr::Or(Box::new(l), Box::new(r))
    }

    /// Bind `field` to every leaf that has none.
    pub fn with_field(self, field: &str) -> Self {
        fn fill(f: String, field: &str) -> String {
            if f.is_empty() {
                field.to_string()
            } else {
                f
            }
        }

        match self {
            Expr::Match { field: f, value } => Expr::Match {
                field: fill(f, field),
                value,
            },
            Expr::Wildcard { field: f, value } => Expr::Wildcard {
                field: fill(f, field),
                value,
            },
            Expr::Regexp { field: f, value } => Expr::Regexp {
                field: fill(f, field),
                value,
            },
            Expr::NumberRange(r) => Expr::NumberRange(Range {
                field: fill(r.field, field),
                ..r
            }),
            Expr::TimeRange(r) => Expr::TimeRange(Range {
                field: fill(r.field, field),
                ..r
            }),
            Expr::Not(e) => Expr::not(e.with_field(field)),
            Expr::And(l, r) => Expr::and(l.with_field(field), r.with_field(field)),
            Expr::Or(l, r) => Expr::or(l.with_field(field), r.with_field(field)),
        }
    }

    /// A bare `*` selects everything.
    pub fn is_match_all(&self) -> bool {
        matches!(self, Expr::Wildcard { field, value } | Expr::Match { field, value }
            if field.is_empty() && value == "*")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn leaf(f: &mut fmt::Formatter<'_>, field: &str, body: String) -> fmt::Result {
            if field.is_empty() {
                write!(f, "{body}")
            } else {
                write!(f, "{field}:{body}")
            }
        }
        fn range(r: &Range) -> String {
            format!(
                "{}{} TO {}{}",
                if r.include_start { '[' } else { '{' },
                r.start.as_deref().unwrap_or("*"),
                r.end.as_deref().unwrap_or("*"),
                if r.include_end { ']' } else { '}' },
            )
        }

        match self {
            Expr::Match { field, value } => leaf(f, field, format!("{value:?}")),
            Expr::Wildcard { field, value } => leaf(f, field, value.clone()),
            Expr::Regexp { field, value } => leaf(f, field, format!("/{value}/")),
            Expr::NumberRange(r) | Expr::TimeRange(r) => leaf(f, &r.field, range(r)),
            Expr::Not(e) => write!(f, "NOT ({e})"),
            Expr::And(l, r) => write!(f, "({l} AND {r})"),
            Expr::Or(l, r) => write!(f, "({l} OR {r})"),
        }
    }
}
