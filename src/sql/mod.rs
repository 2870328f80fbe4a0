//! SQL warehouse translation.
//!
//! This module renders the query IR as SQL fragments for the column store.
//! It includes:
//!
//! - [`dialect`] - SQL dialect implementations (default, HDFS, Doris)
//! - [`condition`] - WHERE fragments from condition groups
//! - [`select`] - SELECT / GROUP BY / ORDER BY from aggregates and orders
//! - [`query_string`] - WHERE fragments from free-text query strings
//! - [`statement`] - full statement assembly
//!
//! All rendering goes through one [`SqlTranslator`], configured once per
//! sub-query and then used read-only. Label pushdown values are returned to
//! the caller rather than kept on the translator.

pub mod condition;
pub mod dialect;
pub mod query_string;
pub mod select;
pub mod statement;

pub use condition::SqlCondition;
pub use dialect::{Dialect, SqlDialect};
pub use select::{SelectPlan, TimeAggregate};
pub use statement::SqlStatement;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::ir::{FieldCodec, FieldsMap, TimeField};

/// Renders IR fragments for one SQL dialect.
#[derive(Debug, Clone)]
pub struct SqlTranslator {
    dialect: Dialect,
    fields: FieldsMap,
    codec: FieldCodec,
    default_field: String,
    time_field: String,
    value_field: String,
    reference_time: Option<DateTime<Utc>>,
}

impl Default for SqlTranslator {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl SqlTranslator {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            fields: FieldsMap::new(),
            codec: FieldCodec::default(),
            default_field: String::new(),
            time_field: TimeField::default().name,
            value_field: String::new(),
            reference_time: None,
        }
    }

    /// Build a translator from the configured dialect and field names.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.sql.dialect)
            .with_default_field(settings.fields.default_field.clone())
            .with_time_field(settings.fields.time_field.clone())
            .with_value_field(settings.fields.value_field.clone())
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_fields(mut self, fields: FieldsMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_codec(mut self, codec: FieldCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Field that unfielded terms and empty dimension names bind to.
    pub fn with_default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = field.into();
        self
    }

    pub fn with_time_field(mut self, field: impl Into<String>) -> Self {
        self.time_field = field.into();
        self
    }

    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_field = field.into();
        self
    }

    /// Instant at which time-zone offsets are resolved. Defaults to now.
    pub fn with_reference_time(mut self, at: DateTime<Utc>) -> Self {
        self.reference_time = Some(at);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn fields(&self) -> &FieldsMap {
        &self.fields
    }

    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }
}
