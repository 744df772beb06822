//! Raw SQL pagination over pooled Postgres connections.

use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;
use pagekit_core::{Dialect, SqlSource};

use crate::{PgConn, PgError, PgResult, TRACING_TARGET_QUERY};

/// Result row of a `COUNT(*)` query.
///
/// Postgres names an unaliased `COUNT(*)` column `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, QueryableByName)]
pub struct CountRow {
    /// Number of counted rows.
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

impl<T> SqlSource<T> for PgConn
where
    T: QueryableByName<Pg> + Send + 'static,
{
    type Error = PgError;

    #[inline]
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn fetch_by_sql(&mut self, sql: &str) -> PgResult<Vec<T>> {
        tracing::debug!(target: TRACING_TARGET_QUERY, sql, "Fetching page");

        let rows = diesel::sql_query(sql)
            .load::<T>(&mut ***self)
            .await
            .map_err(|e| {
                tracing::error!(target: TRACING_TARGET_QUERY, error = %e, sql, "Page query failed");
                PgError::from(e)
            })?;

        Ok(rows)
    }

    async fn count_by_sql(&mut self, sql: &str) -> PgResult<i64> {
        tracing::debug!(target: TRACING_TARGET_QUERY, sql, "Counting rows");

        let row: CountRow = diesel::sql_query(sql)
            .get_result(&mut ***self)
            .await
            .map_err(|e| {
                tracing::error!(target: TRACING_TARGET_QUERY, error = %e, sql, "Count query failed");
                PgError::from(e)
            })?;

        Ok(row.count)
    }
}
