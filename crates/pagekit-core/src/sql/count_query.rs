//! Derivation of row-count queries from arbitrary SELECT statements.

use std::sync::LazyLock;

use regex::Regex;

use super::Dialect;
use crate::TRACING_TARGET_QUERY;

/// Alias given to the derived table of a count query.
pub const COUNT_TABLE_ALIAS: &str = "count_table";

/// Matches a trailing `ORDER BY` clause made of plain column references.
///
/// A column reference is a dotted path of bare, double-quoted or
/// backquoted identifiers, optionally followed by a direction and a nulls
/// ordering. Parentheses are not part of the column list, so an `ORDER BY`
/// that closes a subquery never matches. Quotes must pair up, so a
/// double-quoted literal such as `"x ORDER BY y"` ending the statement is not
/// mistaken for a column list.
static TRAILING_ORDER_BY: LazyLock<Regex> = LazyLock::new(|| {
    const IDENT: &str = r#"(?:\w+|"[^"]*"|`[^`]*`)"#;
    let column = format!(
        r"{IDENT}(?:\s*\.\s*{IDENT})*(?:\s+(?:ASC|DESC))?(?:\s+NULLS\s+(?:FIRST|LAST))?"
    );
    Regex::new(&format!(r"(?i)\bORDER\s+BY\s+{column}(?:\s*,\s*{column})*\z"))
        .expect("trailing ORDER BY pattern is valid")
});

/// Removes a trailing `ORDER BY` clause, along with trailing whitespace and
/// semicolons.
///
/// Only the last clause of the statement is considered. Ordering inside a
/// nested query that ends the statement is left untouched.
pub fn strip_order_by(sql: &str) -> &str {
    let sql = sql.trim_end().trim_end_matches(';').trim_end();
    match TRAILING_ORDER_BY.find(sql) {
        Some(found) => sql[..found.start()].trim_end(),
        None => sql,
    }
}

/// Builds a query counting the rows returned by `sql`.
///
/// The ordering clause is stripped and the rest wrapped as a derived table,
/// aliased as [`COUNT_TABLE_ALIAS`] where the dialect allows it:
///
/// ```rust
/// use pagekit_core::{Dialect, derive_count_query};
///
/// assert_eq!(
///     derive_count_query("SELECT * FROM t ORDER BY created_at DESC", Dialect::Postgres),
///     "SELECT COUNT(*) FROM (SELECT * FROM t) AS count_table",
/// );
/// ```
///
/// The stripping is a heuristic; when it cannot produce a valid subquery for
/// the target engine, supply the total number of entries explicitly instead.
pub fn derive_count_query(sql: &str, dialect: Dialect) -> String {
    let stripped = strip_order_by(sql);

    let mut count_query = format!("SELECT COUNT(*) FROM ({stripped})");
    if dialect.supports_subquery_alias() {
        count_query.push_str(" AS ");
        count_query.push_str(COUNT_TABLE_ALIAS);
    }

    tracing::trace!(
        target: TRACING_TARGET_QUERY,
        %dialect,
        count_query = %count_query,
        "Derived count query"
    );

    count_query
}
