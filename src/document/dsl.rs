//! JSON query DSL building blocks.
//!
//! Leaf constructors return `serde_json::Value` in the shape the search
//! engine expects. [`BoolQuery`] collects clauses and collapses trivial
//! wrappers when it is rendered.

use serde_json::{json, Map, Value};

// =============================================================================
// Leaf Queries
// =============================================================================

pub fn match_phrase(field: &str, value: &str) -> Value {
    json!({ "match_phrase": { field: { "query": value } } })
}

pub fn match_phrase_prefix(field: &str, value: &str) -> Value {
    json!({ "match_phrase_prefix": { field: { "query": value } } })
}

pub fn wildcard(field: &str, value: &str) -> Value {
    json!({ "wildcard": { field: { "value": value } } })
}

pub fn regexp(field: &str, value: &str) -> Value {
    json!({ "regexp": { field: { "value": value } } })
}

pub fn exists(field: &str) -> Value {
    json!({ "exists": { "field": field } })
}

/// Plain `query_string` with only the query text.
pub fn query_string(query: &str) -> Value {
    json!({ "query_string": { "query": query } })
}

/// `query_string` over `fields`, lenient and with wildcard analysis.
pub fn query_string_over(query: &str, fields: &[String]) -> Value {
    json!({
        "query_string": {
            "analyze_wildcard": true,
            "fields": fields,
            "lenient": true,
            "query": query,
        }
    })
}

pub fn nested(path: &str, query: Value) -> Value {
    json!({ "nested": { "path": path, "query": query } })
}

/// Range bounds. `None` leaves that side open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    pub from: Option<Value>,
    pub to: Option<Value>,
    pub include_lower: bool,
    pub include_upper: bool,
    pub format: Option<&'static str>,
}

impl RangeBounds {
    pub fn new() -> Self {
        Self {
            include_lower: true,
            include_upper: true,
            ..Default::default()
        }
    }

    pub fn gt(mut self, v: impl Into<Value>) -> Self {
        self.from = Some(v.into());
        self.include_lower = false;
        self
    }

    pub fn gte(mut self, v: impl Into<Value>) -> Self {
        self.from = Some(v.into());
        self.include_lower = true;
        self
    }

    pub fn lt(mut self, v: impl Into<Value>) -> Self {
        self.to = Some(v.into());
        self.include_upper = false;
        self
    }

    pub fn lte(mut self, v: impl Into<Value>) -> Self {
        self.to = Some(v.into());
        self.include_upper = true;
        self
    }

    pub fn format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }

    pub fn query(self, field: &str) -> Value {
        let mut body = Map::new();
        if let Some(format) = self.format {
            body.insert("format".into(), json!(format));
        }
        body.insert("from".into(), self.from.unwrap_or(Value::Null));
        body.insert("include_lower".into(), json!(self.include_lower));
        body.insert("include_upper".into(), json!(self.include_upper));
        body.insert("to".into(), self.to.unwrap_or(Value::Null));
        json!({ "range": { field: body } })
    }
}

// =============================================================================
// Compound Queries
// =============================================================================

/// `bool` query under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Value>,
    pub should: Vec<Value>,
    pub must_not: Vec<Value>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, q: Value) -> Self {
        self.must.push(q);
        self
    }

    pub fn should(mut self, q: Value) -> Self {
        self.should.push(q);
        self
    }

    pub fn must_not(mut self, q: Value) -> Self {
        self.must_not.push(q);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    /// Render the query.
    ///
    /// A lone `must` or lone `should` clause is returned bare, and an empty
    /// bool renders as `None`. Single-clause lists render as objects.
    pub fn into_query(mut self) -> Option<Value> {
        match (self.must.len(), self.should.len(), self.must_not.len()) {
            (0, 0, 0) => return None,
            (1, 0, 0) => return self.must.pop(),
            (0, 1, 0) => return self.should.pop(),
            _ => {}
        }

        let mut body = Map::new();
        for (key, clauses) in [
            ("must", self.must),
            ("must_not", self.must_not),
            ("should", self.should),
        ] {
            match clauses.len() {
                0 => {}
                1 => {
                    body.insert(key.into(), clauses.into_iter().next().unwrap_or(Value::Null));
                }
                _ => {
                    body.insert(key.into(), Value::Array(clauses));
                }
            }
        }
        Some(json!({ "bool": body }))
    }
}
