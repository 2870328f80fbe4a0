//! Filter predicates shared by every backend translator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TranslateError;

/// Comparison operator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Exact,
    Req,
    Nreq,
    Contains,
    Ncontains,
    Existed,
    Nexisted,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    /// Wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Exact => "exact",
            Operator::Req => "req",
            Operator::Nreq => "nreq",
            Operator::Contains => "contains",
            Operator::Ncontains => "ncontains",
            Operator::Existed => "existed",
            Operator::Nexisted => "nexisted",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
        }
    }

    /// Symbol used when the operator is rendered as a comparison.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Ne | Operator::Ncontains | Operator::Nreq => "!=",
            _ => "=",
        }
    }

    /// Equality family: eq, exact, contains.
    pub fn is_positive_match(&self) -> bool {
        matches!(self, Operator::Eq | Operator::Exact | Operator::Contains)
    }

    /// Negated equality family: ne, ncontains.
    pub fn is_negative_match(&self) -> bool {
        matches!(self, Operator::Ne | Operator::Ncontains)
    }

    /// Single-value range comparisons.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }

    /// Presence checks ignore the value list.
    pub fn is_existence(&self) -> bool {
        matches!(self, Operator::Existed | Operator::Nexisted)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "exact" => Operator::Exact,
            "req" => Operator::Req,
            "nreq" => Operator::Nreq,
            "contains" => Operator::Contains,
            "ncontains" => Operator::Ncontains,
            "existed" => Operator::Existed,
            "nexisted" => Operator::Nexisted,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            other => return Err(TranslateError::UnsupportedOperator(other.to_string())),
        };
        Ok(op)
    }
}

/// One predicate over a field.
///
/// An empty `dimension_name` means "any field". An empty `value` list makes
/// the predicate a no-op, except for `existed`/`nexisted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionField {
    #[serde(rename = "field_name", alias = "dimension_name")]
    pub dimension_name: String,
    #[serde(default)]
    pub value: Vec<String>,
    #[serde(rename = "op", alias = "operator")]
    pub operator: Operator,
    #[serde(default)]
    pub is_wildcard: bool,
    #[serde(default)]
    pub is_prefix: bool,
    #[serde(default)]
    pub is_suffix: bool,
}

impl ConditionField {
    pub fn new<I, S>(field: impl Into<String>, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dimension_name: field.into(),
            value: values.into_iter().map(Into::into).collect(),
            operator,
            is_wildcard: false,
            is_prefix: false,
            is_suffix: false,
        }
    }

    pub fn wildcard(mut self) -> Self {
        self.is_wildcard = true;
        self
    }

    pub fn prefix(mut self) -> Self {
        self.is_prefix = true;
        self
    }

    pub fn suffix(mut self) -> Self {
        self.is_suffix = true;
        self
    }

    /// True when the translators must skip this predicate entirely.
    pub fn is_noop(&self) -> bool {
        self.value.is_empty() && !self.operator.is_existence()
    }

    /// The only value of a single-value operator.
    pub fn single_value(&self) -> Result<&str, TranslateError> {
        match self.value.as_slice() {
            [v] => Ok(v.as_str()),
            _ => Err(TranslateError::ArityViolation {
                operator: self.operator.symbol().to_string(),
            }),
        }
    }
}

/// OR across the outer list, AND across each inner list.
pub type AllConditions = Vec<Vec<ConditionField>>;
