//! Full statement assembly for one sub-query.

use tracing::debug;

use super::dialect::SqlDialect;
use super::select::SelectPlan;
use super::SqlTranslator;
use crate::error::TranslateError;
use crate::ir::{LabelMap, Query, TimeField};

/// A complete SELECT statement with the pieces it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub where_clause: String,
    pub plan: SelectPlan,
    pub labels: LabelMap,
}

impl SqlTranslator {
    /// Render `time >= start AND time < end` in milliseconds.
    pub fn range_time(&self, time_field: &str, start_millis: i64, end_millis: i64) -> String {
        let key = self.dialect.quote_identifier(time_field);
        format!("{key} >= {start_millis} AND {key} < {end_millis}")
    }

    /// Time range, query string and conditions, AND-ed.
    pub fn where_clause(&self, query: &Query, labels: &mut LabelMap) -> Result<String, TranslateError> {
        let mut parts = Vec::new();

        if query.start > 0 || query.end > 0 {
            let time_field = self.query_time_field(query);
            parts.push(self.range_time(&time_field, query.start * 1000, query.end * 1000));
        }

        let qs = self.query_string(&query.query_string, labels)?;
        if !qs.is_empty() {
            parts.push(format!("({})", qs));
        }

        let conditions = self.render_conditions(&query.conditions, labels)?;
        if !conditions.is_empty() {
            parts.push(conditions);
        }

        Ok(parts.join(" AND "))
    }

    /// Render the statement for `query` over `tables`.
    ///
    /// Several tables are combined with `UNION ALL` and filtered per table.
    pub fn statement(&self, query: &Query, tables: &[String]) -> Result<SqlStatement, TranslateError> {
        let translator = self.for_query(query);
        let mut labels = LabelMap::new();
        let plan = translator.build_select(&query.aggregates, &query.orders)?;
        let where_clause = translator.where_clause(query, &mut labels)?;

        let mut sql = format!("SELECT {}", plan.select_fields.join(", "));
        let mut filter = where_clause.clone();

        match tables {
            [] => {}
            [table] => {
                sql.push_str(" FROM ");
                sql.push_str(&self.dialect.quote_identifier(table));
            }
            _ => {
                let stmts: Vec<String> = tables
                    .iter()
                    .map(|t| {
                        let mut s = format!("SELECT * FROM {}", self.dialect.quote_identifier(t));
                        if !filter.is_empty() {
                            s.push_str(" WHERE ");
                            s.push_str(&filter);
                        }
                        s
                    })
                    .collect();
                sql.push_str(&format!(
                    " FROM ({}) AS combined_data",
                    stmts.join(" UNION ALL ")
                ));
                filter.clear();
            }
        }

        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filter);
        }
        if !plan.group_by_fields.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&plan.group_by_fields.join(", "));
        }
        if !plan.order_by_fields.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&plan.order_by_fields.join(", "));
        }
        if query.size > 0 {
            sql.push_str(&format!(" LIMIT {}", query.size));
        }
        if query.from > 0 {
            sql.push_str(&format!(" OFFSET {}", query.from));
        }

        debug!(dialect = %self.dialect, tables = tables.len(), len = sql.len(), "rendered sql statement");
        Ok(SqlStatement {
            sql,
            where_clause,
            plan,
            labels,
        })
    }

    /// Apply per-query overrides of the value and time fields.
    fn for_query(&self, query: &Query) -> SqlTranslator {
        let mut t = self.clone();
        if !query.value_field.is_empty() {
            t.value_field = query.value_field.clone();
        }
        t.time_field = self.query_time_field(query);
        t
    }

    fn query_time_field(&self, query: &Query) -> String {
        match &query.time_field {
            Some(TimeField { name, .. }) if !name.is_empty() => name.clone(),
            _ => self.time_field.clone(),
        }
    }
}
