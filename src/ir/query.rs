//! One logical sub-query, as handed to a backend translator.

use serde::{Deserialize, Serialize};

use super::aggregate::{Aggregates, Orders, TimeField};
use super::condition::AllConditions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub conditions: AllConditions,
    pub aggregates: Aggregates,
    pub orders: Orders,
    pub query_string: String,
    pub value_field: String,
    pub time_field: Option<TimeField>,
    /// Range start in seconds.
    pub start: i64,
    /// Range end in seconds.
    pub end: i64,
    pub from: usize,
    pub size: usize,
}

impl Query {
    pub fn has_aggregates(&self) -> bool {
        !self.aggregates.is_empty()
    }
}
