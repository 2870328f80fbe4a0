//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::TranslateError;
use crate::ir::mapping::PATH_STEP;

/// Alias of the projected metric value.
pub const VALUE_ALIAS: &str = "_value_";
/// Alias of the projected bucket time.
pub const TIMESTAMP_ALIAS: &str = "_timestamp_";
/// Projection of every column.
pub const SELECT_ALL: &str = "*";
/// Minute-granular partition column.
pub const SHARD_KEY: &str = "__shard_key__";

const DAY_MILLIS: u128 = 24 * 60 * 60 * 1000;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with backticks.
/// Used by: Generic, Hdfs, Doris
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Render an object path as `CAST(root["a"]["b"] AS STRING)`.
/// Used by: Doris
pub fn object_path(field: &str) -> String {
    let mut parts = field.split(PATH_STEP);
    let root = parts.next().unwrap_or_default();
    let keys: String = parts.map(|p| format!("[\"{}\"]", p)).collect();
    format!("CAST({}{} AS STRING)", root, keys)
}

// =============================================================================
// String Quoting
// =============================================================================

/// Accept `value` as an unquoted comparison operand only if it is a finite
/// number.
pub fn numeric_operand<'a>(operator: &str, value: &'a str) -> Result<&'a str, TranslateError> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && !trimmed.is_empty() => Ok(trimmed),
        _ => Err(TranslateError::NonNumericOperand {
            operator: operator.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Double embedded single quotes.
pub fn escape_single_quote(s: &str) -> String {
    s.replace('\'', "''")
}

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", escape_single_quote(s))
}

/// Translate unescaped `*`/`?` wildcards into LIKE's `%`/`_`.
pub fn like_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;
    for c in s.chars() {
        match c {
            '\\' if !escaped => {
                escaped = true;
                out.push(c);
                continue;
            }
            '*' if !escaped => out.push('%'),
            '?' if !escaped => out.push('_'),
            _ => out.push(c),
        }
        escaped = false;
    }
    out
}

/// LIKE pattern for a containment value: explicit wildcards are translated,
/// plain values are wrapped in `%`.
pub fn like_pattern(s: &str) -> String {
    if has_unescaped_wildcard(s) {
        like_value(s)
    } else {
        format!("%{}%", s)
    }
}

fn has_unescaped_wildcard(s: &str) -> bool {
    let mut escaped = false;
    for c in s.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '*' | '?' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}

// =============================================================================
// Column Types
// =============================================================================

static ARRAY_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ARRAY<([^>]+)>$").unwrap());

/// Whether a column type is an `ARRAY<T>`.
/// Used by: Doris
pub fn is_array_type(field_type: &str) -> bool {
    ARRAY_TYPE.is_match(field_type)
}

// =============================================================================
// Regular Expressions
// =============================================================================

/// `field REGEXP 'p'`.
/// Used by: Generic, Doris
pub fn regexp_operator(key: &str, pattern: &str, negate: bool) -> String {
    let op = if negate { "NOT REGEXP" } else { "REGEXP" };
    format!("{} {} {}", key, op, quote_string_single(pattern))
}

/// `regexp_like(field, 'p')`.
/// Used by: Hdfs
pub fn regexp_like_function(key: &str, pattern: &str, negate: bool) -> String {
    let call = format!("regexp_like({}, {})", key, quote_string_single(pattern));
    if negate {
        format!("NOT {}", call)
    } else {
        call
    }
}

// =============================================================================
// Time Bucketing
// =============================================================================

/// Whether a window is a whole number of days.
pub fn is_day_aligned(window: Duration) -> bool {
    let ms = window.as_millis();
    ms > 0 && ms % DAY_MILLIS == 0
}

/// Whether a window is a whole number of minutes.
pub fn is_minute_aligned(window: Duration) -> bool {
    let ms = window.as_millis();
    ms > 0 && ms % 60_000 == 0
}

/// Split a signed offset into the operator that applies it, the operator
/// that removes it, and its magnitude.
fn offset_signs(offset: i64) -> (&'static str, &'static str, i64) {
    if offset < 0 {
        ("-", "+", -offset)
    } else {
        ("+", "-", offset)
    }
}

/// Floor-division bucket over a millisecond column, shifted by `offset_millis`.
/// Used by: Generic, Hdfs
pub fn floor_bucket(time_key: &str, window: Duration, offset_millis: i64) -> String {
    let (apply, remove, off) = offset_signs(offset_millis);
    let ms = window.as_millis();
    format!(
        "(FLOOR(({time_key} {apply} {off}) / {ms}) * {ms} {remove} {off})"
    )
}

/// Bucket computed from the minute shard key.
/// Used by: Doris
pub fn shard_key_bucket(window: Duration, offset_millis: i64) -> String {
    let (apply, remove, off) = offset_signs(offset_millis / 60_000);
    let win = window.as_millis() / 60_000;
    format!(
        "((CAST((FLOOR({SHARD_KEY} / 1000) {apply} {off}) / {win} AS INT) * {win} {remove} {off}) * 60 * 1000)"
    )
}

/// Integer-cast bucket over a millisecond column.
/// Used by: Doris
pub fn cast_bucket(time_key: &str, window: Duration, offset_millis: i64) -> String {
    let (apply, remove, off) = offset_signs(offset_millis);
    let ms = window.as_millis();
    format!(
        "(CAST((FLOOR({time_key} {apply} {off}) / {ms}) AS INT) * {ms} {remove} {off})"
    )
}
