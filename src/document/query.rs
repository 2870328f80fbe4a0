//! Condition groups and the time range as query DSL.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::dsl::{self, BoolQuery, RangeBounds};
use super::DocumentTranslator;
use crate::error::TranslateError;
use crate::ir::{AllConditions, ConditionField, Operator, TimeFieldType};

/// Slot in an AND-group: a plain query, or the index of a nested bucket.
enum Slot {
    Query(Value),
    Nested(usize),
}

impl DocumentTranslator {
    /// Time range over the configured time field.
    ///
    /// Date fields take second bounds with an `epoch_second` format, integer
    /// fields take bounds scaled to their unit.
    pub fn range_query(&self) -> Value {
        let field = &self.time_field;
        match field.field_type {
            TimeFieldType::Date => RangeBounds::new()
                .gte(self.start)
                .lte(self.end)
                .format("epoch_second")
                .query(&field.name),
            TimeFieldType::Int => {
                let rate = field.unit.rate();
                RangeBounds::new()
                    .gte(self.start * rate)
                    .lte(self.end * rate)
                    .query(&field.name)
            }
        }
    }

    /// OR of AND-groups. `None` when every condition is a no-op.
    pub fn conditions(&self, all: &AllConditions) -> Result<Option<Value>, TranslateError> {
        let mut or = BoolQuery::new();
        for group in all {
            if let Some(q) = self.and_group(group)? {
                or = or.should(q);
            }
        }
        let query = or.into_query();
        debug!(groups = all.len(), empty = query.is_none(), "rendered document conditions");
        Ok(query)
    }

    /// Conditions sharing a nested path become one nested query, placed where
    /// the first of them appeared.
    fn and_group(&self, group: &[ConditionField]) -> Result<Option<Value>, TranslateError> {
        let mut slots = Vec::new();
        let mut nested: Vec<(String, Vec<Value>)> = Vec::new();
        let mut by_path: HashMap<String, usize> = HashMap::new();

        for cond in group {
            let Some(q) = self.condition(cond)? else {
                continue;
            };
            match self.fields.nested_path(&cond.dimension_name) {
                Some(path) => match by_path.get(path) {
                    Some(&idx) => nested[idx].1.push(q),
                    None => {
                        by_path.insert(path.to_string(), nested.len());
                        slots.push(Slot::Nested(nested.len()));
                        nested.push((path.to_string(), vec![q]));
                    }
                },
                None => slots.push(Slot::Query(q)),
            }
        }

        let mut and = BoolQuery::new();
        for slot in slots {
            match slot {
                Slot::Query(q) => and = and.must(q),
                Slot::Nested(idx) => {
                    let (path, queries) = &mut nested[idx];
                    let inner = std::mem::take(queries)
                        .into_iter()
                        .fold(BoolQuery::new(), BoolQuery::must)
                        .into_query();
                    if let Some(inner) = inner {
                        and = and.must(dsl::nested(path, inner));
                    }
                }
            }
        }
        Ok(and.into_query())
    }

    /// One predicate, without nested wrapping.
    pub fn condition(&self, cond: &ConditionField) -> Result<Option<Value>, TranslateError> {
        if cond.is_noop() {
            return Ok(None);
        }
        let key = cond.dimension_name.as_str();
        let mut q = BoolQuery::new();

        match cond.operator {
            Operator::Existed => return Ok(Some(dsl::exists(key))),
            Operator::Nexisted => {
                return Ok(BoolQuery::new().must_not(dsl::exists(key)).into_query())
            }
            _ => {}
        }

        let mut values = Vec::with_capacity(cond.value.len());
        for value in &cond.value {
            if value.is_empty() && !key.is_empty() && self.fields.uses_exists_for_empty(key) {
                match cond.operator {
                    Operator::Eq | Operator::Exact | Operator::Contains => {
                        q = q.must_not(dsl::exists(key));
                    }
                    Operator::Ne | Operator::Ncontains => {
                        q = q.must(dsl::exists(key));
                    }
                    op => return Err(TranslateError::EmptyValueOperator(op.to_string())),
                }
                continue;
            }
            values.push(value.as_str());
        }

        if !values.is_empty() {
            match cond.operator {
                Operator::Req | Operator::Nreq => {
                    let pattern = values.join("|");
                    let leaf = if key.is_empty() {
                        dsl::query_string(&format!("/{pattern}/"))
                    } else {
                        dsl::regexp(key, &pattern)
                    };
                    q = if cond.operator == Operator::Req {
                        q.should(leaf)
                    } else {
                        q.must_not(leaf)
                    };
                }
                op if op.is_range() => {
                    let v = cond.single_value()?;
                    let bounds = match op {
                        Operator::Gt => RangeBounds::new().gt(v),
                        Operator::Gte => RangeBounds::new().gte(v),
                        Operator::Lt => RangeBounds::new().lt(v),
                        _ => RangeBounds::new().lte(v),
                    };
                    q = q.must(bounds.query(key));
                }
                op => {
                    for value in values {
                        let leaf = self.match_leaf(cond, value);
                        q = if op.is_negative_match() {
                            q.must_not(leaf)
                        } else {
                            q.should(leaf)
                        };
                    }
                }
            }
        }

        Ok(q.into_query())
    }

    fn match_leaf(&self, cond: &ConditionField, value: &str) -> Value {
        let key = cond.dimension_name.as_str();
        if key.is_empty() {
            return dsl::query_string(value);
        }
        // analyzed fields always match as phrases
        let wildcard = cond.is_wildcard
            || matches!(cond.operator, Operator::Contains | Operator::Ncontains);
        if wildcard && !self.fields.is_analyzed(key) {
            return dsl::wildcard(key, &wildcard_value(value));
        }
        if cond.is_prefix {
            return dsl::match_phrase_prefix(key, value);
        }
        dsl::match_phrase(key, value)
    }
}

/// `*v*` unless the value already carries its own wildcards.
fn wildcard_value(value: &str) -> String {
    if value.contains(['*', '?']) {
        value.to_string()
    } else {
        format!("*{value}*")
    }
}
