//! Per-reference sub-queries routed to the remote time-series backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resolved sub-query for one physical table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutedQuery {
    pub table_id: String,
    /// Physical table on the remote backend; empty when unresolved.
    pub vm_rt: String,
    /// Native label-matcher fragment for this table.
    pub vm_condition: String,
    /// Physical cluster serving `vm_rt`.
    pub storage_name: String,
    pub field: String,
    pub metric_names: Vec<String>,
}

/// One aggregation variant of a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceVariant {
    pub reference_name: String,
    pub query_list: Vec<RoutedQuery>,
}

/// Reference name to its variants.
pub type QueryReference = BTreeMap<String, Vec<ReferenceVariant>>;

/// Combined plan for a single direct request to the remote backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmExpand {
    pub metric_filter_condition: BTreeMap<String, String>,
    pub result_table_list: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
}
