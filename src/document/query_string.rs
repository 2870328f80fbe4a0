//! Free-text query strings as query DSL.

use serde_json::{json, Value};
use tracing::debug;

use super::dsl::{self, BoolQuery, RangeBounds};
use super::DocumentTranslator;
use crate::error::TranslateError;
use crate::querystring::{self, Expr, Range};

impl DocumentTranslator {
    /// Parse and render a query string. `None` for a blank string or `*`.
    pub fn query_string(&self, source: &str) -> Result<Option<Value>, TranslateError> {
        let Some(expr) = querystring::parse(source)? else {
            return Ok(None);
        };
        let query = self.walk(&expr)?;
        debug!(len = source.len(), "rendered document query string");
        Ok(Some(query))
    }

    fn walk(&self, expr: &Expr) -> Result<Value, TranslateError> {
        match expr {
            Expr::Not(inner) => Ok(json!({ "bool": { "must_not": self.walk(inner)? } })),
            Expr::And(..) => {
                let mut leaves = Vec::new();
                flatten(expr, true, &mut leaves);
                let mut q = BoolQuery::new();
                for leaf in leaves {
                    q = q.must(self.walk(leaf)?);
                }
                Ok(q.into_query().unwrap_or(Value::Null))
            }
            Expr::Or(..) => {
                let mut leaves = Vec::new();
                flatten(expr, false, &mut leaves);
                let mut q = BoolQuery::new();
                for leaf in leaves {
                    q = q.should(self.walk(leaf)?);
                }
                Ok(q.into_query().unwrap_or(Value::Null))
            }
            Expr::Match { field, value } if field.is_empty() => Ok(dsl::query_string_over(
                &phrase(value),
                &self.query_string_fields,
            )),
            Expr::Match { field, value } => {
                Ok(self.wrap_nested(field, dsl::match_phrase(field, value)))
            }
            Expr::Wildcard { field, value } if field.is_empty() => {
                Ok(dsl::query_string_over(value, &self.query_string_fields))
            }
            Expr::Wildcard { field, value } => {
                Ok(self.wrap_nested(field, dsl::wildcard(field, value)))
            }
            Expr::Regexp { field, value } if field.is_empty() => Ok(dsl::query_string_over(
                &format!("/{value}/"),
                &self.query_string_fields,
            )),
            Expr::Regexp { field, value } => {
                Ok(self.wrap_nested(field, dsl::regexp(field, value)))
            }
            Expr::NumberRange(r) | Expr::TimeRange(r) => self.range(r),
        }
    }

    fn range(&self, r: &Range) -> Result<Value, TranslateError> {
        if r.field.is_empty() {
            return Err(TranslateError::MatchAllUnsupported("range".to_string()));
        }
        let mut bounds = RangeBounds::new();
        if let Some(lower) = r.lower() {
            bounds = if r.include_start {
                bounds.gte(lower)
            } else {
                bounds.gt(lower)
            };
        }
        if let Some(upper) = r.upper() {
            bounds = if r.include_end {
                bounds.lte(upper)
            } else {
                bounds.lt(upper)
            };
        }
        Ok(self.wrap_nested(&r.field, bounds.query(&r.field)))
    }
}

/// Collect the operands of a chain of `And` (or `Or`) nodes.
fn flatten<'a>(expr: &'a Expr, and: bool, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::And(l, r) if and => {
            flatten(l, and, out);
            flatten(r, and, out);
        }
        Expr::Or(l, r) if !and => {
            flatten(l, and, out);
            flatten(r, and, out);
        }
        other => out.push(other),
    }
}

/// Re-quote a phrase so the engine keeps it together.
fn phrase(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}
