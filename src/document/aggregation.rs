//! Nested-aware aggregation tree.
//!
//! The tree is planned as a flat list of [`AggStep`]s, outermost first, and
//! then folded into named JSON aggregations. Planning walks the dimensions with
//! a cursor holding the current nested scope. Before each layer that reads a
//! field, the cursor moves to that field's scope through the lowest common
//! ancestor: `reverse_nested` once per scope left, `nested` once per scope
//! entered.
//!
//! A `_value` order lands on the terms layer closest to the metric. Scope
//! layers in between are single-bucket, so the order key walks through them
//! as `reverse_nested>_value`.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::DocumentTranslator;
use crate::error::TranslateError;
use crate::ir::aggregate::{CARDINALITY, DATE_HISTOGRAM};
use crate::ir::mapping::PATH_STEP;
use crate::ir::{
    short_duration, Aggregate, Aggregates, ConditionField, FieldsMap, Operator, Orders,
    TimeFieldType, FIELD_TIME, FIELD_VALUE,
};

/// Name of the metric aggregation.
pub const METRIC_NAME: &str = FIELD_VALUE;
/// Name of every reverse-scope aggregation.
pub const REVERSE_NESTED: &str = "reverse_nested";
/// Bucket key for documents without the field when include/exclude is set.
pub const MISSING_BUCKET: &str = " ";

/// One layer of the aggregation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggStep {
    /// Enter the nested scope at `path`.
    Nested { path: String },
    /// Leave to `path`, or to the root document when `None`.
    ReverseNested { path: Option<String> },
    Terms {
        field: String,
        size: usize,
        /// `(key, "asc" | "desc")`
        order: Vec<(String, &'static str)>,
        include: Vec<String>,
        exclude: Vec<String>,
    },
    DateHistogram {
        field: String,
        interval: String,
        min: i64,
        max: i64,
        time_zone: Option<String>,
        order: Option<&'static str>,
    },
    Metric { function: &'static str, field: String },
}

impl AggStep {
    /// Key the layer is registered under in its parent.
    pub fn name(&self) -> &str {
        match self {
            AggStep::Nested { path } => path,
            AggStep::ReverseNested { .. } => REVERSE_NESTED,
            AggStep::Terms { field, .. } | AggStep::DateHistogram { field, .. } => field,
            AggStep::Metric { .. } => METRIC_NAME,
        }
    }

    pub fn is_scope(&self) -> bool {
        matches!(self, AggStep::Nested { .. } | AggStep::ReverseNested { .. })
    }

    /// Body of the layer, without sub-aggregations.
    fn body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        match self {
            AggStep::Nested { path } => {
                body.insert("nested".into(), json!({ "path": path }));
            }
            AggStep::ReverseNested { path } => {
                let source = match path {
                    Some(p) => json!({ "path": p }),
                    None => json!({}),
                };
                body.insert("reverse_nested".into(), source);
            }
            AggStep::Terms {
                field,
                size,
                order,
                include,
                exclude,
            } => {
                let mut terms = Map::new();
                terms.insert("field".into(), json!(field));
                if *size > 0 {
                    terms.insert("size".into(), json!(size));
                }
                if !include.is_empty() {
                    terms.insert("include".into(), json!(include));
                }
                if !exclude.is_empty() {
                    terms.insert("exclude".into(), json!(exclude));
                }
                if !include.is_empty() || !exclude.is_empty() {
                    terms.insert("missing".into(), json!(MISSING_BUCKET));
                }
                if !order.is_empty() {
                    let order: Vec<Value> = order.iter().map(|(k, dir)| json!({ k: dir })).collect();
                    terms.insert("order".into(), Value::Array(order));
                }
                body.insert("terms".into(), Value::Object(terms));
            }
            AggStep::DateHistogram {
                field,
                interval,
                min,
                max,
                time_zone,
                order,
            } => {
                let mut hist = Map::new();
                hist.insert("extended_bounds".into(), json!({ "max": max, "min": min }));
                hist.insert("field".into(), json!(field));
                hist.insert("fixed_interval".into(), json!(interval));
                hist.insert("min_doc_count".into(), json!(0));
                if let Some(dir) = order {
                    hist.insert("order".into(), json!({ "_key": dir }));
                }
                if let Some(tz) = time_zone {
                    hist.insert("time_zone".into(), json!(tz));
                }
                body.insert("date_histogram".into(), Value::Object(hist));
            }
            AggStep::Metric { function, field } => {
                body.insert((*function).into(), json!({ "field": field }));
            }
        }
        body
    }
}

/// Fold steps, outermost first, into `{name: {...}}`.
pub fn fold_steps(steps: &[AggStep]) -> Value {
    let mut inner: Option<(String, Value)> = None;
    for step in steps.iter().rev() {
        let mut body = step.body();
        if let Some((name, agg)) = inner.take() {
            let mut sub = Map::new();
            sub.insert(name, agg);
            body.insert("aggregations".into(), Value::Object(sub));
        }
        inner = Some((step.name().to_string(), Value::Object(body)));
    }

    let mut root = Map::new();
    if let Some((name, agg)) = inner {
        root.insert(name, agg);
    }
    Value::Object(root)
}

/// Nested scopes enclosing a field's nested path, outermost first.
///
/// Intermediate prefixes count only when the mapping declares them nested.
fn scope_chain(fields: &FieldsMap, path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let mut chain: Vec<String> = path
        .match_indices(PATH_STEP)
        .map(|(idx, _)| &path[..idx])
        .filter(|prefix| fields.is_nested(prefix))
        .map(str::to_string)
        .collect();
    chain.push(path.to_string());
    chain
}

/// Scope markers that move the cursor from nested path `from` to `to`.
///
/// Leaves every scope below the lowest common ancestor, deepest first, then
/// enters every scope on the way down to `to`. Sibling scopes are never
/// jumped between directly.
pub fn scope_transitions(fields: &FieldsMap, from: &str, to: &str) -> Vec<AggStep> {
    let from_chain = scope_chain(fields, from);
    let to_chain = scope_chain(fields, to);
    let common = from_chain
        .iter()
        .zip(&to_chain)
        .take_while(|(a, b)| a == b)
        .count();

    let mut steps = Vec::new();
    for depth in (common..from_chain.len()).rev() {
        let path = depth.checked_sub(1).map(|parent| from_chain[parent].clone());
        steps.push(AggStep::ReverseNested { path });
    }
    for path in &to_chain[common..] {
        steps.push(AggStep::Nested { path: path.clone() });
    }
    steps
}

/// Terms layer that orders by the metric, and the order key reaching it.
///
/// Walks up from the metric through scope layers only. Their names join the
/// key with `>`; a dotted nested path cannot appear in an order key.
fn value_order_target(steps: &[AggStep]) -> Option<(usize, String)> {
    let (last, rest) = steps.split_last()?;
    if !matches!(last, AggStep::Metric { .. }) {
        return None;
    }
    let mut path = vec![METRIC_NAME];
    for (idx, step) in rest.iter().enumerate().rev() {
        match step {
            AggStep::Terms { .. } => {
                path.reverse();
                return Some((idx, path.join(">")));
            }
            AggStep::Nested { .. } | AggStep::ReverseNested { .. } => {
                let name = step.name();
                if name.contains(PATH_STEP) {
                    return None;
                }
                path.push(name);
            }
            AggStep::DateHistogram { .. } | AggStep::Metric { .. } => return None,
        }
    }
    None
}

fn direction(ast: bool) -> &'static str {
    if ast {
        "asc"
    } else {
        "desc"
    }
}

fn metric_function(name: &str) -> Result<Option<&'static str>, TranslateError> {
    let function = match name {
        "count" => "value_count",
        "sum" => "sum",
        "min" => "min",
        "max" => "max",
        "avg" => "avg",
        CARDINALITY => "cardinality",
        DATE_HISTOGRAM => return Ok(None),
        other => return Err(TranslateError::UnsupportedAggregation(other.to_string())),
    };
    Ok(Some(function))
}

/// Planning state: steps so far and the scope the cursor is in.
struct Planner<'a> {
    fields: &'a FieldsMap,
    steps: Vec<AggStep>,
    cursor: String,
}

impl<'a> Planner<'a> {
    fn move_to(&mut self, field: &str) {
        let path = self.fields.nested_path(field).unwrap_or("");
        self.steps
            .extend(scope_transitions(self.fields, &self.cursor, path));
        self.cursor = path.to_string();
    }

    fn push(&mut self, field: &str, step: AggStep) {
        self.move_to(field);
        self.steps.push(step);
    }
}

impl DocumentTranslator {
    /// Plan the aggregation layers, outermost first.
    ///
    /// Later aggregates wrap earlier ones. Each contributes its terms layers
    /// and, when windowed, a date histogram below them. The metric of element
    /// 0 is the innermost layer.
    pub fn aggregation_steps(
        &self,
        aggregates: &Aggregates,
        orders: &Orders,
    ) -> Result<Vec<AggStep>, TranslateError> {
        let Some(innermost) = aggregates.first() else {
            return Err(TranslateError::EmptyAggregationInput(
                "aggregate list is empty".to_string(),
            ));
        };
        for agg in aggregates {
            metric_function(&agg.name)?;
        }

        let mut planner = Planner {
            fields: &self.fields,
            steps: Vec::new(),
            cursor: String::new(),
        };

        for agg in aggregates.iter().rev() {
            for dim in &agg.dimensions {
                let (include, exclude) = self.bucket_filter(dim);
                planner.push(
                    dim,
                    AggStep::Terms {
                        field: dim.clone(),
                        size: self.size,
                        order: self.terms_order(dim, orders, None),
                        include,
                        exclude,
                    },
                );
            }
            if agg.has_window() {
                let step = self.date_histogram(agg, orders);
                planner.push(&self.time_field.name, step);
            }
        }

        if let Some(function) = metric_function(&innermost.name)? {
            let field = if innermost.field.is_empty() {
                self.value_field.as_str()
            } else {
                innermost.field.as_str()
            };
            if field.is_empty() {
                return Err(TranslateError::EmptyAggregationInput(format!(
                    "{} requires a value field",
                    innermost.name
                )));
            }
            planner.push(
                field,
                AggStep::Metric {
                    function,
                    field: field.to_string(),
                },
            );
        }

        if planner.steps.is_empty() {
            return Err(TranslateError::EmptyAggregationInput(format!(
                "{} without window or dimensions",
                innermost.name
            )));
        }

        if orders.iter().any(|o| o.name == FIELD_VALUE) {
            match value_order_target(&planner.steps) {
                Some((idx, key)) => {
                    if let AggStep::Terms { field, order, .. } = &mut planner.steps[idx] {
                        *order = self.terms_order(field, orders, Some(key.as_str()));
                    }
                }
                None => debug!("no terms layer above the metric, dropping value order"),
            }
        }

        debug!(
            layers = planner.steps.len(),
            scopes = planner.steps.iter().filter(|s| s.is_scope()).count(),
            "planned document aggregation"
        );
        Ok(planner.steps)
    }

    /// Named aggregation tree for the `aggregations` key of a search body.
    pub fn aggregations(
        &self,
        aggregates: &Aggregates,
        orders: &Orders,
    ) -> Result<Value, TranslateError> {
        let steps = self.aggregation_steps(aggregates, orders)?;
        Ok(fold_steps(&steps))
    }

    /// Bucket keys in caller order. `_value` sorts by `value_key` when given.
    fn terms_order(
        &self,
        dim: &str,
        orders: &Orders,
        value_key: Option<&str>,
    ) -> Vec<(String, &'static str)> {
        orders
            .iter()
            .filter_map(|o| {
                if o.name == dim {
                    Some(("_key".to_string(), direction(o.ast)))
                } else if o.name == FIELD_VALUE {
                    value_key.map(|key| (key.to_string(), direction(o.ast)))
                } else {
                    None
                }
            })
            .collect()
    }

    /// `(include, exclude)` term lists for the buckets of `dim`.
    ///
    /// Only a single AND group pins the values a bucket can take. Exact
    /// equality feeds `include`, negated equality feeds `exclude`. Pattern
    /// matches and analyzed fields never do.
    fn bucket_filter(&self, dim: &str) -> (Vec<String>, Vec<String>) {
        let [group] = self.bucket_conditions.as_slice() else {
            return (Vec::new(), Vec::new());
        };
        if self.fields.is_analyzed(dim) || self.fields.is_text(dim) {
            return (Vec::new(), Vec::new());
        }

        let literal = |cond: &&ConditionField| {
            cond.dimension_name == dim && !cond.is_wildcard && !cond.is_prefix && !cond.is_suffix
        };
        let values = |cond: &ConditionField| -> Vec<String> {
            cond.value.iter().filter(|v| !v.is_empty()).cloned().collect()
        };

        let positive: Vec<_> = group
            .iter()
            .filter(literal)
            .filter(|c| matches!(c.operator, Operator::Eq | Operator::Exact))
            .collect();
        // Two equalities on one field intersect, which a single include list cannot say.
        let include = match positive.as_slice() {
            [cond] => values(*cond),
            _ => Vec::new(),
        };

        let mut exclude: Vec<String> = Vec::new();
        for cond in group.iter().filter(literal).filter(|c| c.operator == Operator::Ne) {
            for v in values(cond) {
                if !exclude.contains(&v) {
                    exclude.push(v);
                }
            }
        }
        (include, exclude)
    }

    fn date_histogram(&self, agg: &Aggregate, orders: &Orders) -> AggStep {
        let time = &self.time_field;
        let rate = time.unit.rate();
        let time_zone = (time.field_type == TimeFieldType::Date && !agg.time_zone.is_empty())
            .then(|| agg.time_zone.clone());
        let order = orders
            .iter()
            .find(|o| o.name == FIELD_TIME)
            .map(|o| direction(o.ast));

        AggStep::DateHistogram {
            field: time.name.clone(),
            interval: short_duration(agg.window),
            min: self.start * rate,
            max: self.end * rate,
            time_zone,
            order,
        }
    }
}
