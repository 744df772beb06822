//! Pagination drivers tying page requests, adapters and pages together.
//!
//! Every driver resolves the total number of entries in the same order:
//!
//! 1. an explicit `total_entries` in the page options is used verbatim,
//! 2. a short page implies the total (see [`Pager::replace`]),
//! 3. otherwise the adapter is asked to count.
//!
//! [`Pager::replace`]: crate::Pager::replace

use crate::sql::{derive_count_query, limit_query};
use crate::{
    Page, PageError, PageOptions, PageQuery, PageRequest, PageResult, PageSource, PaginateConfig,
    Pager, SqlSource, TRACING_TARGET_QUERY,
};

/// Fetches one page of the records selected by `query`.
///
/// # Errors
///
/// - [`PageError::InvalidConfig`] if the page options do not resolve, or the
///   source reports a negative count
/// - [`PageError::Query`] if the source fails to fetch or count
#[tracing::instrument(skip_all, target = TRACING_TARGET_QUERY, fields(page, per_page))]
pub async fn paginate<S>(
    source: &mut S,
    query: &PageQuery<S::Filter>,
    config: &PaginateConfig,
) -> PageResult<Page<S::Item>>
where
    S: PageSource + Send,
{
    let request = query.resolve(config)?;
    record_request(&request);

    let mut pager = Pager::new(request, query.options.total_entries)?;
    let items = source
        .fetch(&query.filter, pager.window())
        .await
        .map_err(|e| query_error("fetch", e))?;
    pager.replace(items);

    if pager.total_entries().is_none() {
        tracing::debug!(target: TRACING_TARGET_QUERY, "Counting matching records");
        let total = source
            .count(&query.filter)
            .await
            .map_err(|e| query_error("count", e))?;
        pager.set_total_entries(total)?;
    }

    let page = pager.finish();
    tracing::debug!(
        target: TRACING_TARGET_QUERY,
        items = page.len(),
        total_entries = ?page.total_entries().ok(),
        "Fetched page"
    );

    Ok(page)
}

/// Fetches one page of the rows returned by a raw SQL query.
///
/// The dialect's limit clause is appended to `sql` to fetch the page. When the
/// total number of entries is neither supplied nor implied by a short page, a
/// count query is derived from `sql` with [`derive_count_query`] and run
/// through the source.
///
/// # Errors
///
/// - [`PageError::InvalidConfig`] if the page options do not resolve, or the
///   count query returns a negative number
/// - [`PageError::Query`] if either query fails
#[tracing::instrument(skip_all, target = TRACING_TARGET_QUERY, fields(page, per_page))]
pub async fn paginate_by_sql<T, S>(
    source: &mut S,
    sql: &str,
    options: &PageOptions,
    config: &PaginateConfig,
) -> PageResult<Page<T>>
where
    S: SqlSource<T> + Send,
{
    let request = PageRequest::resolve(options, config)?;
    record_request(&request);

    let dialect = source.dialect();
    let mut pager = Pager::new(request, options.total_entries)?;

    let paged_sql = limit_query(sql, dialect, pager.window());
    let items = source
        .fetch_by_sql(&paged_sql)
        .await
        .map_err(|e| query_error("fetch_by_sql", e))?;
    pager.replace(items);

    if pager.total_entries().is_none() {
        let count_sql = derive_count_query(sql, dialect);
        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %dialect,
            "Counting rows with derived query"
        );
        let total = source
            .count_by_sql(&count_sql)
            .await
            .map_err(|e| query_error("count_by_sql", e))?;
        pager.set_total_entries(total)?;
    }

    Ok(pager.finish())
}

/// Visits every record selected by `query`, one page at a time.
///
/// Starts at the requested page and stops after the first short page. No count
/// query is issued. Returns the number of records visited.
///
/// # Errors
///
/// - [`PageError::InvalidConfig`] if the page options do not resolve
/// - [`PageError::Query`] if the source fails to fetch a page
#[tracing::instrument(skip_all, target = TRACING_TARGET_QUERY)]
pub async fn for_each_item<S, F>(
    source: &mut S,
    query: &PageQuery<S::Filter>,
    config: &PaginateConfig,
    mut f: F,
) -> PageResult<i64>
where
    S: PageSource + Send,
    F: FnMut(S::Item),
{
    let mut request = query.resolve(config)?;
    let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
    let mut visited = 0_i64;

    loop {
        let mut items = source
            .fetch(&query.filter, request.window())
            .await
            .map_err(|e| query_error("fetch", e))?;
        items.truncate(limit);

        let fetched = items.len();
        tracing::trace!(
            target: TRACING_TARGET_QUERY,
            page = request.page(),
            fetched,
            "Visiting page"
        );

        visited += fetched as i64;
        items.into_iter().for_each(&mut f);

        if fetched < limit {
            break;
        }
        request = request.next();
    }

    tracing::debug!(target: TRACING_TARGET_QUERY, visited, "Visited all records");
    Ok(visited)
}

fn record_request(request: &PageRequest) {
    let span = tracing::Span::current();
    span.record("page", request.page());
    span.record("per_page", request.per_page());
}

fn query_error(operation: &'static str, error: impl Into<crate::BoxError>) -> PageError {
    let error = PageError::query(error);
    tracing::error!(target: TRACING_TARGET_QUERY, operation, error = %error, "Pagination query failed");
    error
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::{Dialect, Window};

    /// Numbers `1..=len` filtered by divisibility.
    struct Numbers {
        len: i64,
        fetches: Vec<Window>,
        counts: usize,
        sql: Vec<String>,
    }

    impl Numbers {
        fn new(len: i64) -> Self {
            Self {
                len,
                fetches: Vec::new(),
                counts: 0,
                sql: Vec::new(),
            }
        }

        fn matching(&self, divisor: i64) -> impl Iterator<Item = i64> {
            (1..=self.len).filter(move |n| n % divisor == 0)
        }
    }

    impl PageSource for Numbers {
        type Error = Infallible;
        type Filter = i64;
        type Item = i64;

        async fn fetch(&mut self, divisor: &i64, window: Window) -> Result<Vec<i64>, Infallible> {
            self.fetches.push(window);
            Ok(self
                .matching(*divisor)
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect())
        }

        async fn count(&mut self, divisor: &i64) -> Result<i64, Infallible> {
            self.counts += 1;
            Ok(self.matching(*divisor).count() as i64)
        }
    }

    impl SqlSource<i64> for Numbers {
        type Error = std::io::Error;

        fn dialect(&self) -> Dialect {
            Dialect::Postgres
        }

        async fn fetch_by_sql(&mut self, sql: &str) -> Result<Vec<i64>, std::io::Error> {
            self.sql.push(sql.to_owned());
            Ok((1..=self.len).take(3).collect())
        }

        async fn count_by_sql(&mut self, sql: &str) -> Result<i64, std::io::Error> {
            self.sql.push(sql.to_owned());
            self.counts += 1;
            Ok(self.len)
        }
    }

    struct Failing;

    impl PageSource for Failing {
        type Error = std::io::Error;
        type Filter = ();
        type Item = ();

        async fn fetch(&mut self, _: &(), _: Window) -> Result<Vec<()>, std::io::Error> {
            Err(std::io::Error::other("connection refused"))
        }

        async fn count(&mut self, _: &()) -> Result<i64, std::io::Error> {
            Err(std::io::Error::other("connection refused"))
        }
    }

    /// Serves full pages of zeros but reports a negative count.
    struct NegativeCount;

    impl PageSource for NegativeCount {
        type Error = Infallible;
        type Filter = ();
        type Item = i64;

        async fn fetch(&mut self, _: &(), window: Window) -> Result<Vec<i64>, Infallible> {
            Ok(vec![0; window.limit as usize])
        }

        async fn count(&mut self, _: &()) -> Result<i64, Infallible> {
            Ok(-1)
        }
    }

    impl SqlSource<i64> for NegativeCount {
        type Error = Infallible;

        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }

        async fn fetch_by_sql(&mut self, _: &str) -> Result<Vec<i64>, Infallible> {
            Ok(vec![0; 10])
        }

        async fn count_by_sql(&mut self, _: &str) -> Result<i64, Infallible> {
            Ok(-1)
        }
    }

    #[tokio::test]
    async fn negative_count_is_rejected() {
        let config = PaginateConfig::default();
        let query = PageQuery::new(()).per_page(10);

        let err = paginate(&mut NegativeCount, &query, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::InvalidConfig(_)));

        let options = PageOptions::new().with_per_page(10);
        let err = paginate_by_sql::<i64, _>(&mut NegativeCount, "SELECT 0", &options, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn paginate_counts_full_pages() {
        let mut source = Numbers::new(100);
        let query = PageQuery::new(2).page(2).per_page(10);

        let page = paginate(&mut source, &query, &PaginateConfig::default())
            .await
            .expect("pagination should succeed");

        assert_eq!(page.items(), (22..=40).step_by(2).collect::<Vec<_>>().as_slice());
        assert_eq!(page.total_entries().unwrap(), 50);
        assert_eq!(page.total_pages().unwrap(), 5);
        assert_eq!(source.fetches, vec![Window { offset: 10, limit: 10 }]);
        assert_eq!(source.counts, 1);
    }

    #[tokio::test]
    async fn paginate_with_explicit_total_skips_count() {
        let mut source = Numbers::new(100);
        let query = PageQuery::new(1).per_page(10).total_entries(7);

        let page = paginate(&mut source, &query, &PaginateConfig::default())
            .await
            .expect("pagination should succeed");

        assert_eq!(page.total_entries().unwrap(), 7);
        assert_eq!(source.counts, 0);
    }

    #[tokio::test]
    async fn paginate_infers_total_from_short_page() {
        let mut source = Numbers::new(25);
        let query = PageQuery::new(1).page(3).per_page(10);

        let page = paginate(&mut source, &query, &PaginateConfig::default())
            .await
            .expect("pagination should succeed");

        assert_eq!(page.len(), 5);
        assert_eq!(page.total_entries().unwrap(), 25);
        assert_eq!(source.counts, 0);
    }

    #[tokio::test]
    async fn paginate_out_of_bounds_page() {
        let mut source = Numbers::new(10);
        let query = PageQuery::new(1).page(2).per_page(10);

        let page = paginate(&mut source, &query, &PaginateConfig::default())
            .await
            .expect("pagination should succeed");

        assert!(page.is_empty());
        assert_eq!(source.counts, 1);
        assert!(page.is_out_of_bounds().unwrap());
    }

    #[tokio::test]
    async fn paginate_rejects_invalid_per_page() {
        let mut source = Numbers::new(10);
        let query = PageQuery::new(1).per_page(0);

        let err = paginate(&mut source, &query, &PaginateConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PageError::InvalidConfig(_)));
        assert!(source.fetches.is_empty());
    }

    #[tokio::test]
    async fn paginate_propagates_source_errors() {
        let err = paginate(&mut Failing, &PageQuery::new(()), &PaginateConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PageError::Query(_)));
        assert_eq!(err.to_string(), "Query error: connection refused");
    }

    #[tokio::test]
    async fn paginate_by_sql_derives_count_query() {
        let mut source = Numbers::new(40);
        let options = PageOptions::new().with_page(2).with_per_page(3);

        let page = paginate_by_sql(
            &mut source,
            "SELECT n FROM numbers ORDER BY n DESC",
            &options,
            &PaginateConfig::default(),
        )
        .await
        .expect("pagination should succeed");

        assert_eq!(page.total_entries().unwrap(), 40);
        assert_eq!(
            source.sql,
            vec![
                "SELECT n FROM numbers ORDER BY n DESC LIMIT 3 OFFSET 3".to_owned(),
                "SELECT COUNT(*) FROM (SELECT n FROM numbers) AS count_table".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn paginate_by_sql_with_explicit_total_skips_derivation() {
        let mut source = Numbers::new(40);
        let options = PageOptions::new().with_per_page(3).with_total_entries(12);

        let page = paginate_by_sql(
            &mut source,
            "SELECT n FROM numbers ORDER BY n",
            &options,
            &PaginateConfig::default(),
        )
        .await
        .expect("pagination should succeed");

        assert_eq!(page.total_entries().unwrap(), 12);
        assert_eq!(source.sql.len(), 1);
        assert_eq!(source.counts, 0);
    }

    #[tokio::test]
    async fn for_each_item_walks_all_pages() {
        let mut source = Numbers::new(23);
        let query = PageQuery::new(1).per_page(5);
        let mut seen = Vec::new();

        let visited = for_each_item(&mut source, &query, &PaginateConfig::default(), |n| {
            seen.push(n)
        })
        .await
        .expect("iteration should succeed");

        assert_eq!(visited, 23);
        assert_eq!(seen, (1..=23).collect::<Vec<_>>());
        assert_eq!(source.fetches.len(), 5);
        assert_eq!(source.counts, 0);
    }

    #[tokio::test]
    async fn for_each_item_stops_on_empty_page() {
        let mut source = Numbers::new(10);
        let query = PageQuery::new(1).per_page(5);

        let visited = for_each_item(&mut source, &query, &PaginateConfig::default(), |_| {})
            .await
            .expect("iteration should succeed");

        assert_eq!(visited, 10);
        assert_eq!(
            source.fetches,
            vec![
                Window { offset: 0, limit: 5 },
                Window { offset: 5, limit: 5 },
                Window { offset: 10, limit: 5 },
            ]
        );
    }
}
