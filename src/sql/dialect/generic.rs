//! Generic warehouse SQL dialect.
//!
//! The reference rendering every other dialect starts from:
//! - Backtick identifier quoting (`` `name` ``)
//! - Dotted object paths are rejected
//! - `REGEXP` / `NOT REGEXP` operators
//! - `=`/`IN` equality, `LIKE` for wildcards
//! - Floor-division time buckets projected through `MAX(...)`

use super::SqlDialect;

/// Generic warehouse dialect, selected by the `default` key.
#[derive(Debug, Clone, Copy)]
pub struct Generic;

impl SqlDialect for Generic {
    fn name(&self) -> &'static str {
        "default"
    }

    // Everything else uses the trait defaults.
}
