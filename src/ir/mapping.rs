//! Field type metadata and alias encoding.
//!
//! A [`FieldsMap`] is read-only per query. Translators consult it to decide
//! between phrase and exact matching and to find nested scopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const TYPE_TEXT: &str = "text";
pub const TYPE_KEYWORD: &str = "keyword";
pub const TYPE_NESTED: &str = "nested";

/// Separator between object-path segments.
pub const PATH_STEP: char = '.';

/// Type information for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOption {
    #[serde(rename = "type")]
    pub field_type: String,
    pub is_analyzed: bool,
}

impl FieldOption {
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            is_analyzed: false,
        }
    }

    pub fn analyzed(mut self) -> Self {
        self.is_analyzed = true;
        self
    }
}

/// Field name to type information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldsMap(BTreeMap<String, FieldOption>);

impl FieldsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, option: FieldOption) -> Self {
        self.insert(name, option);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, option: FieldOption) {
        self.0.insert(name.into(), option);
    }

    pub fn get(&self, name: &str) -> Option<&FieldOption> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field_type(&self, name: &str) -> Option<&str> {
        self.get(name).map(|o| o.field_type.as_str())
    }

    pub fn is_text(&self, name: &str) -> bool {
        self.field_type(name) == Some(TYPE_TEXT)
    }

    pub fn is_analyzed(&self, name: &str) -> bool {
        self.get(name).is_some_and(|o| o.is_analyzed)
    }

    pub fn is_nested(&self, name: &str) -> bool {
        self.field_type(name) == Some(TYPE_NESTED)
    }

    /// Whether an empty-string value on this field means "field is absent".
    ///
    /// String-typed fields compare against `""` directly.
    pub fn uses_exists_for_empty(&self, name: &str) -> bool {
        !matches!(self.field_type(name), Some(TYPE_TEXT) | Some(TYPE_KEYWORD))
    }

    /// Longest proper ancestor of `field` declared as nested, if any.
    pub fn nested_path<'a>(&self, field: &'a str) -> Option<&'a str> {
        let mut end = field.len();
        while let Some(pos) = field[..end].rfind(PATH_STEP) {
            let candidate = &field[..pos];
            if self.is_nested(candidate) {
                return Some(candidate);
            }
            end = pos;
        }
        None
    }

    /// Flatten a document-store mapping (`properties` recursion) into dotted names.
    pub fn from_mapping(mapping: &Value) -> Self {
        let mut fields = FieldsMap::new();
        collect_properties("", mapping, &mut fields);
        fields
    }
}

impl FromIterator<(String, FieldOption)> for FieldsMap {
    fn from_iter<T: IntoIterator<Item = (String, FieldOption)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn collect_properties(prefix: &str, data: &Value, out: &mut FieldsMap) {
    if !prefix.is_empty() {
        if let Some(t) = data.get("type").and_then(Value::as_str) {
            let mut option = FieldOption::new(t);
            option.is_analyzed = t == TYPE_TEXT && data.get("analyzer").is_some();
            out.insert(prefix, option);
        }
    }

    if let Some(Value::Object(props)) = data.get("properties") {
        for (name, child) in props {
            let key = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}{PATH_STEP}{name}")
            };
            if child.is_object() {
                collect_properties(&key, child, out);
            }
        }
    }
}

/// Encode/decode pair that keeps object-path names identifier-safe.
#[derive(Debug, Clone, Copy)]
pub struct FieldCodec {
    encode: fn(&str) -> String,
    decode: fn(&str) -> String,
}

const ENCODED_STEP: &str = "__bk_46__";

fn default_encode(s: &str) -> String {
    s.replace(PATH_STEP, ENCODED_STEP)
}

fn default_decode(s: &str) -> String {
    s.replace(ENCODED_STEP, ".")
}

impl Default for FieldCodec {
    fn default() -> Self {
        Self {
            encode: default_encode,
            decode: default_decode,
        }
    }
}

impl FieldCodec {
    pub fn new(encode: fn(&str) -> String, decode: fn(&str) -> String) -> Self {
        Self { encode, decode }
    }

    pub fn encode(&self, s: &str) -> String {
        (self.encode)(s)
    }

    pub fn decode(&self, s: &str) -> String {
        (self.decode)(s)
    }
}
