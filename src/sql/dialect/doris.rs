//! Doris SQL dialect.
//!
//! Doris differences from the generic dialect:
//! - Object paths render as `CAST(root["a"]["b"] AS STRING)` under an encoded alias
//! - Text columns match with `MATCH_PHRASE_PREFIX` (`MATCH_PHRASE_EDGE` for suffixes)
//! - Analyzed columns and `contains` match with `MATCH_PHRASE`
//! - A single empty value on eq/ne means `IS NULL`/`IS NOT NULL`
//! - `ARRAY<T>` columns are matched element-wise
//! - Minute-aligned time buckets divide the `__shard_key__` column

use std::time::Duration;

use super::helpers;
use super::{FieldExpr, MatchStyle, SqlDialect, TimeBucket};
use crate::error::TranslateError;
use crate::ir::mapping::PATH_STEP;
use crate::ir::{ConditionField, FieldCodec, FieldsMap, Operator};

/// Doris SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Doris;

impl SqlDialect for Doris {
    fn name(&self) -> &'static str {
        "doris"
    }

    fn field_expr(&self, field: &str, codec: &FieldCodec) -> Result<FieldExpr, TranslateError> {
        if !field.contains(PATH_STEP) {
            return Ok(FieldExpr::column(self.quote_identifier(field)));
        }
        Ok(FieldExpr {
            expr: helpers::object_path(field),
            alias: Some(codec.encode(field)),
        })
    }

    fn match_style(&self, fields: &FieldsMap, cond: &ConditionField) -> MatchStyle {
        let field = cond.dimension_name.as_str();
        if cond.is_wildcard {
            MatchStyle::Like
        } else if cond.is_prefix {
            MatchStyle::PhrasePrefix
        } else if cond.is_suffix {
            MatchStyle::PhraseEdge
        } else if fields.is_text(field) {
            MatchStyle::PhrasePrefix
        } else if fields.is_analyzed(field)
            || matches!(cond.operator, Operator::Contains | Operator::Ncontains)
        {
            MatchStyle::Phrase
        } else {
            MatchStyle::Equal
        }
    }

    fn empty_value_is_null(&self) -> bool {
        true
    }

    fn is_array(&self, fields: &FieldsMap, field: &str) -> bool {
        fields
            .field_type(field)
            .is_some_and(helpers::is_array_type)
    }

    fn time_bucket(&self, time_field: &str, window: Duration, offset_millis: i64) -> TimeBucket {
        let expr = if helpers::is_minute_aligned(window) {
            helpers::shard_key_bucket(window, offset_millis)
        } else {
            helpers::cast_bucket(&self.quote_identifier(time_field), window, offset_millis)
        };
        let alias = self.quote_identifier(helpers::TIMESTAMP_ALIAS);
        TimeBucket {
            select: format!("{} AS {}", expr, alias),
            group_by: alias,
        }
    }
}
