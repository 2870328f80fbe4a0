//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for warehouse dialect
//! differences. Each dialect implements `SqlDialect` to handle its specific
//! syntax:
//!
//! - Object-path fields: rejected (Default, HDFS) vs `CAST(a["b"] AS STRING)` (Doris)
//! - Regular expressions: `REGEXP` vs `regexp_like(...)`
//! - Text matching: `=`/`IN` vs `MATCH_PHRASE*` on analyzed columns
//! - Time bucketing: floor division vs shard-key division
//!
//! # Usage
//!
//! ```ignore
//! use prism::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Doris;
//! let quoted = dialect.quote_identifier("host");  // `host`
//! ```

mod doris;
mod generic;
mod hdfs;
pub mod helpers;

pub use doris::Doris;
pub use generic::Generic;
pub use hdfs::Hdfs;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::TranslateError;
use crate::ir::{ConditionField, FieldCodec, FieldsMap, Operator};

/// A rendered column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpr {
    /// Expression usable in WHERE and GROUP BY.
    pub expr: String,
    /// Identifier-safe alias, set when `expr` is not a plain column.
    pub alias: Option<String>,
}

impl FieldExpr {
    pub fn column(expr: String) -> Self {
        Self { expr, alias: None }
    }

    /// Projection form: `expr AS `alias`` for computed columns.
    pub fn select(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.expr, helpers::quote_backtick(alias)),
            None => self.expr.clone(),
        }
    }

    /// Name to group and order by.
    pub fn group_key(&self) -> String {
        match &self.alias {
            Some(alias) => helpers::quote_backtick(alias),
            None => self.expr.clone(),
        }
    }
}

/// How a string equality is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStyle {
    /// `=`; several values collapse to `IN`.
    Equal,
    /// `LIKE` containment.
    Like,
    Phrase,
    PhrasePrefix,
    PhraseEdge,
}

impl MatchStyle {
    /// SQL operator for the positive or negated form.
    pub fn operator(&self, negate: bool) -> &'static str {
        match (self, negate) {
            (MatchStyle::Equal, false) => "=",
            (MatchStyle::Equal, true) => "!=",
            (MatchStyle::Like, false) => "LIKE",
            (MatchStyle::Like, true) => "NOT LIKE",
            (MatchStyle::Phrase, false) => "MATCH_PHRASE",
            (MatchStyle::Phrase, true) => "NOT MATCH_PHRASE",
            (MatchStyle::PhrasePrefix, false) => "MATCH_PHRASE_PREFIX",
            (MatchStyle::PhrasePrefix, true) => "NOT MATCH_PHRASE_PREFIX",
            (MatchStyle::PhraseEdge, false) => "MATCH_PHRASE_EDGE",
            (MatchStyle::PhraseEdge, true) => "NOT MATCH_PHRASE_EDGE",
        }
    }

    /// Only plain equality may be folded into `IN (...)`.
    pub fn allows_in_list(&self) -> bool {
        matches!(self, MatchStyle::Equal)
    }
}

/// Time bucket expressions for a windowed aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    pub select: String,
    pub group_by: String,
}

/// SQL dialect trait - defines how query fragments are rendered.
///
/// The default implementations follow the generic warehouse syntax.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (column, alias).
    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    /// Quote a string literal, doubling embedded single quotes.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Render a field reference.
    ///
    /// Dotted object paths are rejected unless the dialect overrides this.
    fn field_expr(&self, field: &str, codec: &FieldCodec) -> Result<FieldExpr, TranslateError> {
        let _ = codec;
        if field.contains(crate::ir::mapping::PATH_STEP) {
            return Err(TranslateError::UnsupportedFieldShape(field.to_string()));
        }
        Ok(FieldExpr::column(self.quote_identifier(field)))
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Render a regular-expression match.
    fn regex_match(&self, key: &str, pattern: &str, negate: bool) -> String {
        helpers::regexp_operator(key, pattern, negate)
    }

    /// Choose how an equality-family condition is matched.
    fn match_style(&self, fields: &FieldsMap, cond: &ConditionField) -> MatchStyle {
        let _ = fields;
        if cond.is_wildcard {
            MatchStyle::Like
        } else {
            MatchStyle::Equal
        }
    }

    /// Whether a single `""` value on eq/ne means `IS NULL`/`IS NOT NULL`.
    fn empty_value_is_null(&self) -> bool {
        false
    }

    /// Whether the column holds an array of scalars.
    fn is_array(&self, fields: &FieldsMap, field: &str) -> bool {
        let _ = (fields, field);
        false
    }

    /// Render a field-presence check.
    fn existence(&self, key: &str, operator: Operator) -> String {
        if operator == Operator::Nexisted {
            format!("{} IS NULL", key)
        } else {
            format!("{} IS NOT NULL", key)
        }
    }

    // =========================================================================
    // Time Bucketing
    // =========================================================================

    /// Bucket the millisecond time column into `window`-sized slots.
    fn time_bucket(&self, time_field: &str, window: Duration, offset_millis: i64) -> TimeBucket {
        let expr = helpers::floor_bucket(&self.quote_identifier(time_field), window, offset_millis);
        TimeBucket {
            select: format!(
                "MAX{} AS {}",
                expr,
                self.quote_identifier(helpers::TIMESTAMP_ALIAS)
            ),
            group_by: expr,
        }
    }
}

/// Supported SQL dialects (enum wrapper for easy selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Default,
    Hdfs,
    Doris,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Default => &Generic,
            Dialect::Hdfs => &Hdfs,
            Dialect::Doris => &Doris,
        }
    }

    /// Select a dialect by its storage key. Unknown keys use `Default`.
    pub fn from_key(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "hdfs" => Dialect::Hdfs,
            "doris" => Dialect::Doris,
            _ => Dialect::Default,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn field_expr(&self, field: &str, codec: &FieldCodec) -> Result<FieldExpr, TranslateError> {
        self.dialect().field_expr(field, codec)
    }

    fn regex_match(&self, key: &str, pattern: &str, negate: bool) -> String {
        self.dialect().regex_match(key, pattern, negate)
    }

    fn match_style(&self, fields: &FieldsMap, cond: &ConditionField) -> MatchStyle {
        self.dialect().match_style(fields, cond)
    }

    fn empty_value_is_null(&self) -> bool {
        self.dialect().empty_value_is_null()
    }

    fn is_array(&self, fields: &FieldsMap, field: &str) -> bool {
        self.dialect().is_array(fields, field)
    }

    fn existence(&self, key: &str, operator: Operator) -> String {
        self.dialect().existence(key, operator)
    }

    fn time_bucket(&self, time_field: &str, window: Duration, offset_millis: i64) -> TimeBucket {
        self.dialect().time_bucket(time_field, window, offset_millis)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
