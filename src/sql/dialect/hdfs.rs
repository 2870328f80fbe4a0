//! HDFS-backed warehouse dialect.
//!
//! HDFS differences from the generic dialect:
//! - Regular expressions use the `regexp_like(field, 'p')` function

use super::helpers;
use super::SqlDialect;

/// HDFS warehouse dialect.
#[derive(Debug, Clone, Copy)]
pub struct Hdfs;

impl SqlDialect for Hdfs {
    fn name(&self) -> &'static str {
        "hdfs"
    }

    fn regex_match(&self, key: &str, pattern: &str, negate: bool) -> String {
        helpers::regexp_like_function(key, pattern, negate)
    }
}
