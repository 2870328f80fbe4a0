//! Document-store translation.
//!
//! Renders the query IR as the JSON query and aggregation DSL of an
//! inverted-index document store:
//!
//! - [`dsl`] - leaf and `bool` query builders
//! - [`query`] - condition groups and the time range
//! - [`aggregation`] - the nested-aware aggregation tree
//! - [`query_string`] - free-text query strings
//!
//! Fields under a declared `nested` object must be matched and aggregated
//! inside a nested scope. [`DocumentTranslator`] looks those scopes up in its
//! [`FieldsMap`].

pub mod aggregation;
pub mod dsl;
pub mod query;
pub mod query_string;

pub use aggregation::{scope_transitions, AggStep};
pub use dsl::{BoolQuery, RangeBounds};

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::Settings;
use crate::error::TranslateError;
use crate::ir::{AllConditions, FieldsMap, LabelMap, Query, TimeField, FIELD_TIME, FIELD_VALUE};
use crate::querystring;

/// Renders IR fragments for the document store.
#[derive(Debug, Clone)]
pub struct DocumentTranslator {
    fields: FieldsMap,
    value_field: String,
    time_field: TimeField,
    /// Range start in seconds.
    start: i64,
    /// Range end in seconds.
    end: i64,
    size: usize,
    query_string_fields: Vec<String>,
    /// Filter the query applies; narrows terms buckets.
    bucket_conditions: AllConditions,
}

impl Default for DocumentTranslator {
    fn default() -> Self {
        Self {
            fields: FieldsMap::new(),
            value_field: String::new(),
            time_field: TimeField::default(),
            start: 0,
            end: 0,
            size: 0,
            query_string_fields: vec!["*".to_string(), "__*".to_string()],
            bucket_conditions: AllConditions::new(),
        }
    }
}

impl DocumentTranslator {
    pub fn new(fields: FieldsMap) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::default()
            .with_value_field(settings.fields.value_field.clone())
            .with_time_field(settings.fields.time())
            .with_size(settings.document.size)
            .with_query_string_fields(settings.document.query_string_fields.clone())
    }

    pub fn with_fields(mut self, fields: FieldsMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_field = field.into();
        self
    }

    pub fn with_time_field(mut self, field: TimeField) -> Self {
        self.time_field = field;
        self
    }

    /// Range in seconds.
    pub fn with_range(mut self, start: i64, end: i64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_query_string_fields(mut self, fields: Vec<String>) -> Self {
        self.query_string_fields = fields;
        self
    }

    pub fn with_bucket_conditions(mut self, conditions: AllConditions) -> Self {
        self.bucket_conditions = conditions;
        self
    }

    pub fn fields(&self) -> &FieldsMap {
        &self.fields
    }

    pub fn time_field(&self) -> &TimeField {
        &self.time_field
    }

    /// Longest declared nested ancestor of `field`, or `""` at the root.
    pub fn nested_path<'a>(&self, field: &'a str) -> &'a str {
        self.fields.nested_path(field).unwrap_or("")
    }

    /// Wrap `query` in a nested scope when `field` lives under one.
    fn wrap_nested(&self, field: &str, query: Value) -> Value {
        match self.fields.nested_path(field) {
            Some(path) => dsl::nested(path, query),
            None => query,
        }
    }

    /// Complete search request body for `query`.
    ///
    /// Hits are not returned for aggregated queries.
    pub fn search_body(&self, query: &Query) -> Result<Value, TranslateError> {
        let translator = self.for_query(query);

        let mut filters = BoolQuery::new();
        if translator.start > 0 || translator.end > 0 {
            filters = filters.must(translator.range_query());
        }
        if let Some(q) = translator.conditions(&query.conditions)? {
            filters = filters.must(q);
        }
        if let Some(q) = translator.query_string(&query.query_string)? {
            filters = filters.must(q);
        }

        let mut body = Map::new();
        if let Some(q) = filters.into_query() {
            body.insert("query".into(), q);
        }

        if query.has_aggregates() {
            let aggs = translator.aggregations(&query.aggregates, &query.orders)?;
            body.insert("aggregations".into(), aggs);
            body.insert("size".into(), json!(0));
        } else {
            let sort = translator.sort(query);
            if !sort.is_empty() {
                body.insert("sort".into(), Value::Array(sort));
            }
            if query.from > 0 {
                body.insert("from".into(), json!(query.from));
            }
            let size = if query.size > 0 { query.size } else { translator.size };
            body.insert("size".into(), json!(size));
        }

        debug!(
            aggregated = query.has_aggregates(),
            conditions = query.conditions.len(),
            "built document search body"
        );
        Ok(Value::Object(body))
    }

    /// Values `query` binds positively, from its conditions and query string.
    ///
    /// Unfielded query-string terms are recorded under the first query-string
    /// field.
    pub fn labels(&self, query: &Query) -> Result<LabelMap, TranslateError> {
        let mut labels = LabelMap::from_conditions(&query.conditions);
        if let Some(expr) = querystring::parse(&query.query_string)? {
            let default_field = self.query_string_fields.first().map_or("", String::as_str);
            let mut terms = LabelMap::new();
            terms.add_expr(&expr, default_field);
            labels.merge(terms);
        }
        Ok(labels)
    }

    /// Hit sort. `_value` and `_time` map to the value and time fields.
    fn sort(&self, query: &Query) -> Vec<Value> {
        query
            .orders
            .iter()
            .filter_map(|order| {
                let field = match order.name.as_str() {
                    FIELD_VALUE => self.value_field.as_str(),
                    FIELD_TIME => self.time_field.name.as_str(),
                    name => name,
                };
                if field.is_empty() || !self.fields.contains(field) {
                    return None;
                }
                let dir = if order.ast { "asc" } else { "desc" };
                Some(json!({ field: { "order": dir } }))
            })
            .collect()
    }

    fn for_query(&self, query: &Query) -> DocumentTranslator {
        let mut t = self.clone();
        if !query.value_field.is_empty() {
            t.value_field = query.value_field.clone();
        }
        if let Some(time) = &query.time_field {
            if !time.name.is_empty() {
                t.time_field = time.clone();
            }
        }
        if query.start > 0 || query.end > 0 {
            t.start = query.start;
            t.end = query.end;
        }
        t.bucket_conditions = query.conditions.clone();
        t
    }
}
