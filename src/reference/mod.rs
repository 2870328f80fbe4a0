//! Merging per-reference sub-queries into one remote time-series request.
//!
//! Each reference name may resolve to several physical tables. When every
//! table can be queried directly, the filter fragments of one reference are
//! OR-ed together and the tables of all references are collected into a
//! single [`VmExpand`].

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::TranslateError;
use crate::ir::{QueryReference, VmExpand};

/// Joins condition fragments of one reference.
pub const CONDITION_SEPARATOR: &str = " or ";

/// Combines sibling sub-queries for direct execution.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMerger {
    /// Cluster groups that must never be queried together.
    forbidden_clusters: Vec<Vec<String>>,
}

impl ReferenceMerger {
    pub fn new(forbidden_clusters: Vec<Vec<String>>) -> Self {
        Self { forbidden_clusters }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.reference.forbidden_clusters.clone())
    }

    /// Merge `reference` into one request plan.
    ///
    /// Returns `Ok(None)` when no sub-query has a resolved physical table.
    /// Only the first variant of each reference is used, and sub-queries
    /// without a physical table are skipped.
    pub fn merge(&self, reference: &QueryReference) -> Result<Option<VmExpand>, TranslateError> {
        let mut conditions = BTreeMap::new();
        let mut tables = BTreeSet::new();
        let mut clusters = BTreeSet::new();

        for (name, variants) in reference {
            let Some(variant) = variants.first() else {
                continue;
            };
            if variants.len() > 1 {
                debug!(reference = %name, variants = variants.len(), "using first variant only");
            }

            let mut fragments: Vec<&str> = Vec::new();
            for query in &variant.query_list {
                if query.vm_rt.is_empty() {
                    debug!(reference = %name, table_id = %query.table_id, "skipping unresolved table");
                    continue;
                }
                tables.insert(query.vm_rt.clone());
                clusters.insert(query.storage_name.as_str());
                if !query.vm_condition.is_empty() && !fragments.contains(&query.vm_condition.as_str()) {
                    fragments.push(&query.vm_condition);
                }
            }

            if !fragments.is_empty() {
                conditions.insert(name.clone(), fragments.join(CONDITION_SEPARATOR));
            }
        }

        if tables.is_empty() {
            debug!(references = reference.len(), "no resolved tables, direct query not possible");
            return Ok(None);
        }

        self.check_clusters(&clusters)?;

        let cluster_name = match clusters.len() {
            1 => clusters.iter().next().map(|c| c.to_string()).unwrap_or_default(),
            _ => String::new(),
        };

        debug!(
            references = conditions.len(),
            tables = tables.len(),
            cluster = %cluster_name,
            "merged query reference"
        );
        Ok(Some(VmExpand {
            metric_filter_condition: conditions,
            result_table_list: tables.into_iter().collect(),
            cluster_name,
        }))
    }

    /// Fail when every cluster of a forbidden group is in use.
    fn check_clusters(&self, clusters: &BTreeSet<&str>) -> Result<(), TranslateError> {
        for group in &self.forbidden_clusters {
            if group.is_empty() {
                continue;
            }
            if group.iter().all(|c| clusters.contains(c.as_str())) {
                warn!(group = ?group, "query spans a forbidden cluster group");
                return Err(TranslateError::ClusterConflict);
            }
        }
        Ok(())
    }
}
