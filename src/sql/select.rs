//! SELECT / GROUP BY / ORDER BY from aggregates and orders.

use chrono::{Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

use super::dialect::{helpers, SqlDialect};
use super::SqlTranslator;
use crate::error::TranslateError;
use crate::ir::aggregate::{CARDINALITY, DATE_HISTOGRAM};
use crate::ir::{Aggregates, Orders, FIELD_TIME, FIELD_VALUE};

/// Time bucketing applied by a select plan, used downstream for zero-filling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeAggregate {
    pub window: Duration,
    pub offset_millis: i64,
}

/// Rendered projection, grouping and ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectPlan {
    pub select_fields: Vec<String>,
    pub group_by_fields: Vec<String>,
    pub order_by_fields: Vec<String>,
    /// Names an aggregated query may be ordered by.
    pub dimensions: BTreeSet<String>,
    pub time_aggregate: Option<TimeAggregate>,
}

impl SqlTranslator {
    /// Build the select plan for `aggregates`, keeping only orders the plan
    /// can honour.
    pub fn build_select(
        &self,
        aggregates: &Aggregates,
        orders: &Orders,
    ) -> Result<SelectPlan, TranslateError> {
        let mut plan = SelectPlan::default();
        plan.dimensions.insert(FIELD_VALUE.to_string());

        let value = if self.value_field.is_empty() || self.value_field == helpers::SELECT_ALL {
            helpers::SELECT_ALL.to_string()
        } else {
            self.dialect.field_expr(&self.value_field, &self.codec)?.expr
        };
        let value_alias = self.dialect.quote_identifier(helpers::VALUE_ALIAS);

        let mut window = Duration::ZERO;
        let mut time_zone = "";

        for agg in aggregates {
            for dim in &agg.dimensions {
                plan.dimensions.insert(dim.clone());
                let expr = self.dialect.field_expr(dim, &self.codec)?;
                plan.select_fields.push(expr.select());
                plan.group_by_fields.push(expr.group_key());
            }

            match agg.name.as_str() {
                CARDINALITY => plan
                    .select_fields
                    .push(format!("COUNT(DISTINCT {}) AS {}", value, value_alias)),
                DATE_HISTOGRAM => {}
                name => plan.select_fields.push(format!(
                    "{}({}) AS {}",
                    name.to_uppercase(),
                    value,
                    value_alias
                )),
            }

            if agg.has_window() {
                window = agg.window;
                time_zone = agg.time_zone.as_str();
            }
        }

        if !window.is_zero() {
            let offset_millis = self.time_zone_offset(window, time_zone);
            let bucket = self
                .dialect
                .time_bucket(&self.time_field, window, offset_millis);
            plan.select_fields.push(bucket.select);
            plan.group_by_fields.push(bucket.group_by);
            plan.dimensions.insert(FIELD_TIME.to_string());
            plan.time_aggregate = Some(TimeAggregate {
                window,
                offset_millis,
            });
        }

        if plan.select_fields.is_empty() {
            plan.select_fields.push(helpers::SELECT_ALL.to_string());
            if !self.value_field.is_empty() {
                plan.select_fields
                    .push(format!("{} AS {}", value, value_alias));
            }
            if !self.time_field.is_empty() {
                plan.select_fields.push(format!(
                    "{} AS {}",
                    self.dialect.quote_identifier(&self.time_field),
                    self.dialect.quote_identifier(helpers::TIMESTAMP_ALIAS)
                ));
            }
        }

        let mut seen = BTreeSet::new();
        for order in orders {
            if !aggregates.is_empty() && !plan.dimensions.contains(&order.name) {
                continue;
            }
            let field = match order.name.as_str() {
                FIELD_VALUE => value_alias.clone(),
                FIELD_TIME => self.dialect.quote_identifier(helpers::TIMESTAMP_ALIAS),
                name => self.dialect.field_expr(name, &self.codec)?.group_key(),
            };
            if !seen.insert(field.clone()) {
                continue;
            }
            plan.order_by_fields
                .push(format!("{} {}", field, order.direction()));
        }

        debug!(
            dialect = %self.dialect,
            select = plan.select_fields.len(),
            group_by = plan.group_by_fields.len(),
            order_by = plan.order_by_fields.len(),
            "built sql select plan"
        );
        Ok(plan)
    }

    /// Offset of `time_zone` from UTC in milliseconds.
    ///
    /// Only day-aligned windows are shifted; shorter windows bucket in UTC.
    pub fn time_zone_offset(&self, window: Duration, time_zone: &str) -> i64 {
        if !helpers::is_day_aligned(window) || time_zone.is_empty() {
            return 0;
        }
        let tz: Tz = match time_zone.parse() {
            Ok(tz) => tz,
            Err(_) => {
                warn!(time_zone, "unknown time zone, bucketing in UTC");
                return 0;
            }
        };
        let at = self.reference_time.unwrap_or_else(Utc::now);
        let offset = tz.offset_from_utc_datetime(&at.naive_utc()).fix();
        i64::from(offset.local_minus_utc()) * 1000
    }
}
