//! WHERE fragments from free-text query strings.

use tracing::debug;

use super::dialect::{helpers, SqlDialect};
use super::SqlTranslator;
use crate::error::TranslateError;
use crate::ir::{ConditionField, LabelMap, Operator};
use crate::querystring::{self, Expr, Range};

impl SqlTranslator {
    /// Parse and render a query string. A blank string or `*` renders as `""`.
    pub fn query_string(&self, source: &str, labels: &mut LabelMap) -> Result<String, TranslateError> {
        let Some(expr) = querystring::parse(source)? else {
            return Ok(String::new());
        };
        let rendered = self.walk(&expr, labels, false)?;
        debug!(dialect = %self.dialect, len = rendered.len(), "rendered query string");
        Ok(rendered)
    }

    fn walk(&self, expr: &Expr, labels: &mut LabelMap, negated: bool) -> Result<String, TranslateError> {
        match expr {
            Expr::Not(inner) => Ok(format!("NOT ({})", self.walk(inner, labels, true)?)),
            Expr::Or(l, r) => Ok(format!(
                "({} OR {})",
                self.walk(l, labels, negated)?,
                self.walk(r, labels, negated)?
            )),
            Expr::And(l, r) => Ok(format!(
                "{} AND {}",
                self.walk(l, labels, negated)?,
                self.walk(r, labels, negated)?
            )),
            Expr::Wildcard { field, value } => {
                let field = self.term_field(field, value)?;
                let key = self.dialect.field_expr(field, &self.codec)?.expr;
                if !negated {
                    labels.add(field, value, Operator::Contains);
                }
                let pattern = helpers::like_value(value.trim_matches(|c| c == '*' || c == '?'));
                Ok(format!(
                    "{} LIKE {}",
                    key,
                    self.dialect.quote_string(&format!("%{}%", pattern))
                ))
            }
            Expr::Match { field, value } => {
                let field = self.term_field(field, value)?;
                let key = self.dialect.field_expr(field, &self.codec)?.expr;
                if !negated {
                    labels.add(field, value, Operator::Eq);
                }
                let cond = ConditionField::new(field, Operator::Eq, [value.as_str()]);
                let style = self.dialect.match_style(&self.fields, &cond);
                Ok(format!(
                    "{} {} {}",
                    key,
                    style.operator(false),
                    self.dialect.quote_string(value)
                ))
            }
            Expr::Regexp { field, value } => {
                let field = self.term_field(field, value)?;
                let key = self.dialect.field_expr(field, &self.codec)?.expr;
                Ok(self.dialect.regex_match(&key, value, false))
            }
            Expr::NumberRange(r) => self.range(r, false),
            Expr::TimeRange(r) => self.range(r, true),
        }
    }

    fn term_field<'a>(&'a self, field: &'a str, value: &str) -> Result<&'a str, TranslateError> {
        if !field.is_empty() {
            return Ok(field);
        }
        if self.default_field.is_empty() {
            return Err(TranslateError::MatchAllUnsupported(value.to_string()));
        }
        Ok(&self.default_field)
    }

    fn range(&self, r: &Range, quoted: bool) -> Result<String, TranslateError> {
        let field = self.term_field(&r.field, "range")?;
        let key = self.dialect.field_expr(field, &self.codec)?.expr;
        let literal = |op: &str, v: &str| -> Result<String, TranslateError> {
            if quoted {
                Ok(self.dialect.quote_string(v))
            } else {
                helpers::numeric_operand(op, v).map(str::to_string)
            }
        };

        let mut parts = Vec::with_capacity(2);
        if let Some(lower) = r.lower() {
            let op = if r.include_start { ">=" } else { ">" };
            parts.push(format!("{} {} {}", key, op, literal(op, lower)?));
        }
        if let Some(upper) = r.upper() {
            let op = if r.include_end { "<=" } else { "<" };
            parts.push(format!("{} {} {}", key, op, literal(op, upper)?));
        }
        Ok(parts.join(" AND "))
    }
}
