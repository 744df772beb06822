//! SQL helpers for pagination over raw queries.
//!
//! This module provides the dialect-specific pieces needed to paginate a raw
//! SELECT statement: the limit clause appended to the item query, and the
//! count query derived from it.

mod count_query;
mod dialect;

pub use count_query::{COUNT_TABLE_ALIAS, derive_count_query, strip_order_by};
pub use dialect::Dialect;

/// Appends the dialect's limit clause for `window` to `sql`.
///
/// Trailing whitespace and semicolons are removed first.
pub fn limit_query(sql: &str, dialect: Dialect, window: crate::Window) -> String {
    let sql = sql.trim_end().trim_end_matches(';').trim_end();
    format!("{sql} {}", dialect.limit_clause(window))
}
