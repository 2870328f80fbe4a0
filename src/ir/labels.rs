//! Label pushdown: literal filter values seen during translation.
//!
//! Translators record every value they bind into a positive equality or match
//! so callers can highlight hits without re-parsing the query. The map is an
//! explicit accumulator passed by `&mut`; it is never shared between queries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::condition::{AllConditions, ConditionField, Operator};
use crate::querystring::Expr;

/// One recorded value and how it was matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelValue {
    pub value: String,
    pub operator: Operator,
}

/// Field name to recorded values, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<String, Vec<LabelValue>>);

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value. Repeats of the same (field, value, operator) are ignored.
    pub fn add(&mut self, field: &str, value: &str, operator: Operator) {
        if field.is_empty() || value.is_empty() {
            return;
        }
        let entry = self.0.entry(field.to_string()).or_default();
        if entry
            .iter()
            .any(|l| l.value == value && l.operator == operator)
        {
            return;
        }
        entry.push(LabelValue {
            value: value.to_string(),
            operator,
        });
    }

    /// Record every value of a positive equality-family condition.
    pub fn add_condition(&mut self, cond: &ConditionField) {
        if !cond.operator.is_positive_match() {
            return;
        }
        let operator = if cond.is_wildcard {
            Operator::Contains
        } else {
            Operator::Eq
        };
        for v in &cond.value {
            self.add(&cond.dimension_name, v, operator);
        }
    }

    /// Record the positive terms of a query-string tree.
    ///
    /// Terms under `NOT` are skipped. Unfielded terms bind to `default_field`.
    pub fn add_expr(&mut self, expr: &Expr, default_field: &str) {
        match expr {
            Expr::Match { field, value } => {
                self.add(or_default(field, default_field), value, Operator::Eq)
            }
            Expr::Wildcard { field, value } => {
                self.add(or_default(field, default_field), value, Operator::Contains)
            }
            Expr::And(l, r) | Expr::Or(l, r) => {
                self.add_expr(l, default_field);
                self.add_expr(r, default_field);
            }
            Expr::Not(_) | Expr::Regexp { .. } | Expr::NumberRange(_) | Expr::TimeRange(_) => {}
        }
    }

    /// Collect labels from a condition list without translating it.
    pub fn from_conditions(conditions: &AllConditions) -> Self {
        let mut labels = LabelMap::new();
        for cond in conditions.iter().flatten() {
            labels.add_condition(cond);
        }
        labels
    }

    /// Fold another map into this one.
    pub fn merge(&mut self, other: LabelMap) {
        for (field, values) in other.0 {
            for v in values {
                self.add(&field, &v.value, v.operator);
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&[LabelValue]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<LabelValue>)> {
        self.0.iter()
    }
}

fn or_default<'a>(field: &'a str, default_field: &'a str) -> &'a str {
    if field.is_empty() {
        default_field
    } else {
        field
    }
}
