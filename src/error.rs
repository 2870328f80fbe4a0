//! Error taxonomy shared by all translators.

use crate::querystring::ParseError;

/// Translation failure. Terminal for the sub-query that produced it.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("unknown operator {0}")]
    UnsupportedOperator(String),

    #[error("operator {operator} only support 1 value")]
    ArityViolation { operator: String },

    #[error("operator {operator} needs a numeric value, got {value:?}")]
    NonNumericOperand { operator: String, value: String },

    #[error("query is not support object with {0}")]
    UnsupportedFieldShape(String),

    #[error("empty aggregation input: {0}")]
    EmptyAggregationInput(String),

    #[error("aggregation is not support this type {0}")]
    UnsupportedAggregation(String),

    #[error("operator {0} is not support with empty value")]
    EmptyValueOperator(String),

    #[error("match all is not supported: {0}")]
    MatchAllUnsupported(String),

    #[error(transparent)]
    QueryString(#[from] ParseError),

    #[error("vm Cluster conflict")]
    ClusterConflict,
}
