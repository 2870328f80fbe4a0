//! Backend-agnostic intermediate representation.
//!
//! Every translator consumes these types:
//!
//! - [`condition`] - predicates and AND/OR condition groups
//! - [`aggregate`] - aggregation pipeline, orders, time field
//! - [`labels`] - label pushdown accumulator
//! - [`mapping`] - field type metadata and alias codec
//! - [`query`] - one logical sub-query
//! - [`reference`] - remote time-series references and the merged plan

pub mod aggregate;
pub mod condition;
pub mod labels;
pub mod mapping;
pub mod query;
pub mod reference;

pub use aggregate::{
    short_duration, Aggregate, Aggregates, Order, Orders, TimeField, TimeFieldType, TimeUnit,
    FIELD_TIME, FIELD_VALUE,
};
pub use condition::{AllConditions, ConditionField, Operator};
pub use labels::{LabelMap, LabelValue};
pub use mapping::{FieldCodec, FieldOption, FieldsMap};
pub use query::Query;
pub use reference::{QueryReference, ReferenceVariant, RoutedQuery, VmExpand};
