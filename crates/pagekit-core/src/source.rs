//! Adapter traits implemented per host query engine.
//!
//! Pagination never reaches into a query engine directly. Instead the engine
//! is wrapped in an adapter exposing exactly the operations pagination needs,
//! and the adapter is passed to the drivers in [`paginate`](crate::paginate).

use std::future::Future;

use crate::{BoxError, Dialect, Window};

/// A query engine that can fetch a window of filtered records and count them.
///
/// `Filter` is the query-intent descriptor: a typed description of which
/// records to return. Implementations translate it into their own query
/// language.
pub trait PageSource {
    /// Record type returned by the engine.
    type Item: Send;
    /// Filter describing which records to return.
    type Filter: Sync;
    /// Error returned by the engine.
    type Error: Into<BoxError>;

    /// Fetches the records matching `filter` within `window`, in order.
    fn fetch(
        &mut self,
        filter: &Self::Filter,
        window: Window,
    ) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>> + Send;

    /// Counts all records matching `filter`, ignoring ordering and windowing.
    fn count(
        &mut self,
        filter: &Self::Filter,
    ) -> impl Future<Output = Result<i64, Self::Error>> + Send;
}

/// A query engine that can run raw SQL.
pub trait SqlSource<T> {
    /// Error returned by the engine.
    type Error: Into<BoxError>;

    /// Returns the SQL dialect spoken by the engine.
    fn dialect(&self) -> Dialect;

    /// Runs `sql` and returns the resulting records, in order.
    fn fetch_by_sql(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send;

    /// Runs a `COUNT(*)` query and returns its scalar result.
    fn count_by_sql(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<i64, Self::Error>> + Send;
}
