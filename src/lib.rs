//! # Prism
//!
//! Translates one storage-agnostic observability query into the native
//! query languages of heterogeneous backends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Query IR (conditions, aggregates, orders)       │
//! │          + field type metadata + query string            │
//! └─────────────────────────────────────────────────────────┘
//!              │                  │                  │
//!              ▼ [sql]            ▼ [document]       ▼ [reference]
//! ┌──────────────────┐ ┌────────────────────┐ ┌──────────────────┐
//! │ SELECT / WHERE / │ │ query DSL + nested │ │ merged label     │
//! │ GROUP BY / ORDER │ │ aggregation tree   │ │ filters + tables │
//! └──────────────────┘ └────────────────────┘ └──────────────────┘
//! ```
//!
//! Each translator is configured once per sub-query and then used
//! read-only. Executing the rendered queries is left to the caller.

pub mod config;
pub mod document;
pub mod error;
pub mod ir;
pub mod querystring;
pub mod reference;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::document::DocumentTranslator;
    pub use crate::error::TranslateError;
    pub use crate::ir::{
        Aggregate, AllConditions, ConditionField, FieldOption, FieldsMap, LabelMap, Operator,
        Order, Query, QueryReference, TimeField, VmExpand,
    };
    pub use crate::reference::ReferenceMerger;
    pub use crate::sql::{Dialect, SqlDialect, SqlTranslator};
}

pub use document::DocumentTranslator;
pub use error::TranslateError;
pub use reference::ReferenceMerger;
pub use sql::{Dialect, SqlTranslator};
