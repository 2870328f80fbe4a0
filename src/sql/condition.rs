//! WHERE fragments from condition groups.
//!
//! Groups are OR-ed, conditions inside a group are AND-ed. A single group is
//! rendered bare; several are wrapped in one pair of parentheses. Conditions
//! present in every group are rendered once, in front of the OR.

use tracing::debug;

use super::dialect::{helpers, SqlDialect};
use super::SqlTranslator;
use crate::error::TranslateError;
use crate::ir::{AllConditions, ConditionField, LabelMap, Operator};

/// A rendered WHERE fragment with the labels bound into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlCondition {
    pub expr: String,
    pub labels: LabelMap,
}

impl SqlCondition {
    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }
}

impl SqlTranslator {
    /// Render every condition group.
    pub fn conditions(&self, all: &AllConditions) -> Result<SqlCondition, TranslateError> {
        let mut labels = LabelMap::new();
        let expr = self.render_conditions(all, &mut labels)?;
        Ok(SqlCondition { expr, labels })
    }

    /// Render every condition group into `labels`' accumulator.
    pub fn render_conditions(
        &self,
        all: &AllConditions,
        labels: &mut LabelMap,
    ) -> Result<String, TranslateError> {
        let (common, remaining) = split_common(all);

        let mut parts = Vec::with_capacity(common.len() + 1);
        for cond in &common {
            let part = self.render_condition(cond, labels)?;
            if !part.is_empty() {
                parts.push(part);
            }
        }

        let mut groups = Vec::with_capacity(remaining.len());
        for group in &remaining {
            let mut and = Vec::with_capacity(group.len());
            for cond in group {
                let part = self.render_condition(cond, labels)?;
                if !part.is_empty() {
                    and.push(part);
                }
            }
            if !and.is_empty() {
                groups.push(and.join(" AND "));
            }
        }
        match groups.len() {
            0 => {}
            1 => parts.push(groups.remove(0)),
            _ => parts.push(format!("({})", groups.join(" OR "))),
        }

        let expr = parts.join(" AND ");
        debug!(
            dialect = %self.dialect,
            groups = all.len(),
            common = common.len(),
            len = expr.len(),
            "rendered sql conditions"
        );
        Ok(expr)
    }

    /// Render a single condition. No-op conditions render as `""`.
    pub fn render_condition(
        &self,
        cond: &ConditionField,
        labels: &mut LabelMap,
    ) -> Result<String, TranslateError> {
        if cond.is_noop() {
            return Ok(String::new());
        }

        let cond = self.resolve_field(cond)?;
        let field = cond.dimension_name.as_str();
        let key = self.dialect.field_expr(field, &self.codec)?.expr;
        let array = self.dialect.is_array(&self.fields, field);

        let rendered = match cond.operator {
            Operator::Existed | Operator::Nexisted => self.dialect.existence(&key, cond.operator),
            op if op.is_positive_match() => {
                labels.add_condition(&cond);
                self.render_match(&cond, &key, array, false)
            }
            op if op.is_negative_match() => self.render_match(&cond, &key, array, true),
            Operator::Req | Operator::Nreq => {
                let negate = cond.operator == Operator::Nreq;
                let pattern = cond.value.join("|");
                if array {
                    let op = if negate { "NOT REGEXP" } else { "REGEXP" };
                    array_match_any(&format!("{} {}", op, self.dialect.quote_string(&pattern)), &key)
                } else {
                    self.dialect.regex_match(&key, &pattern, negate)
                }
            }
            op => {
                let value = helpers::numeric_operand(op.symbol(), cond.single_value()?)?;
                if array {
                    array_match_any(&format!("{} {}", op.symbol(), value), &key)
                } else {
                    format!("{} {} {}", key, op.symbol(), value)
                }
            }
        };
        Ok(rendered)
    }

    /// Bind empty and `*` dimension names to the default field.
    fn resolve_field(&self, cond: &ConditionField) -> Result<ConditionField, TranslateError> {
        if !cond.dimension_name.is_empty() && cond.dimension_name != "*" {
            return Ok(cond.clone());
        }
        if self.default_field.is_empty() {
            return Err(TranslateError::MatchAllUnsupported(cond.value.join(",")));
        }
        let mut resolved = cond.clone();
        resolved.dimension_name = self.default_field.clone();
        Ok(resolved)
    }

    /// Equality family, positive (OR-joined) or negated (AND-joined).
    fn render_match(&self, cond: &ConditionField, key: &str, array: bool, negate: bool) -> String {
        if self.dialect.empty_value_is_null() && cond.value.len() == 1 && cond.value[0].is_empty()
        {
            let op = if negate { Operator::Existed } else { Operator::Nexisted };
            return self.dialect.existence(key, op);
        }

        let style = self.dialect.match_style(&self.fields, cond);
        if cond.value.len() > 1 && style.allows_in_list() && !array {
            let list: Vec<String> = cond
                .value
                .iter()
                .map(|v| self.dialect.quote_string(v))
                .collect();
            let op = if negate { "NOT IN" } else { "IN" };
            return format!("{} {} ({})", key, op, list.join(", "));
        }

        let filters: Vec<String> = cond
            .value
            .iter()
            .map(|v| {
                if array {
                    self.array_value_match(key, v, cond.is_wildcard, negate)
                } else {
                    let literal = if cond.is_wildcard {
                        helpers::like_pattern(v)
                    } else {
                        v.clone()
                    };
                    format!(
                        "{} {} {}",
                        key,
                        style.operator(negate),
                        self.dialect.quote_string(&literal)
                    )
                }
            })
            .collect();

        let joiner = if negate { " AND " } else { " OR " };
        match filters.len() {
            1 => filters.join(""),
            _ => format!("({})", filters.join(joiner)),
        }
    }

    fn array_value_match(&self, key: &str, value: &str, wildcard: bool, negate: bool) -> String {
        if wildcard {
            let op = if negate { "NOT LIKE" } else { "LIKE" };
            let pattern = helpers::like_pattern(value);
            array_match_any(
                &format!("{} {}", op, self.dialect.quote_string(&pattern)),
                key,
            )
        } else {
            let cmp = if negate { "!=" } else { "==" };
            format!(
                "ARRAY_CONTAINS({}, {}) {} 1",
                key,
                self.dialect.quote_string(value),
                cmp
            )
        }
    }
}

/// Split conditions present in every group from the rest.
///
/// Common conditions keep the order of the last group. When a group holds
/// nothing but common conditions the OR is always satisfied once they hold,
/// so no remaining groups are returned.
fn split_common(all: &AllConditions) -> (Vec<&ConditionField>, Vec<Vec<&ConditionField>>) {
    let borrowed = || -> Vec<Vec<&ConditionField>> {
        all.iter().map(|g| g.iter().collect()).collect()
    };
    let Some(last) = all.last() else {
        return (Vec::new(), Vec::new());
    };
    if all.len() < 2 {
        return (Vec::new(), borrowed());
    }

    let mut common: Vec<&ConditionField> = Vec::new();
    for cond in last {
        if !common.contains(&cond) && all.iter().all(|group| group.contains(cond)) {
            common.push(cond);
        }
    }
    if common.is_empty() {
        return (common, borrowed());
    }

    let mut remaining = Vec::with_capacity(all.len());
    for group in all {
        let rest: Vec<&ConditionField> = group.iter().filter(|c| !common.contains(c)).collect();
        if rest.is_empty() {
            return (common, Vec::new());
        }
        remaining.push(rest);
    }
    (common, remaining)
}

/// `ARRAY_MATCH_ANY(x -> x <predicate>, key)`
fn array_match_any(predicate: &str, key: &str) -> String {
    format!("ARRAY_MATCH_ANY(x -> x {}, {})", predicate, key)
}
