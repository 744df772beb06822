//! In-memory [`PageSource`] and [`SqlSource`].

use std::marker::PhantomData;
use std::sync::LazyLock;

use pagekit_core::{Dialect, PageSource, SqlSource, Window};
use regex::Regex;

/// Matches the limit clause appended by `paginate_by_sql`, in any dialect.
static LIMIT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:LIMIT\s+(?P<limit>\d+)\s+OFFSET\s+(?P<offset>\d+)|OFFSET\s+(?P<ora_offset>\d+)\s+ROWS\s+FETCH\s+NEXT\s+(?P<ora_limit>\d+)\s+ROWS\s+ONLY)\s*\z",
    )
    .expect("limit clause pattern is valid")
});

/// Decides whether a record is selected by a filter.
pub trait RecordFilter<T>: Sync {
    /// Returns whether `record` matches.
    fn matches(&self, record: &T) -> bool;
}

/// Filter selecting every record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MatchAll;

impl<T> RecordFilter<T> for MatchAll {
    #[inline]
    fn matches(&self, _: &T) -> bool {
        true
    }
}

/// Error returned by a [`MemorySource`] set up to fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// The source was configured to fail every call.
    #[error("{0}")]
    Injected(String),
    /// A raw query carried no recognisable limit clause.
    #[error("Query has no limit clause: {0}")]
    MissingLimit(String),
}

/// Calls received by a [`MemorySource`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceStats {
    /// Windows requested through `fetch`.
    pub fetches: Vec<Window>,
    /// Number of `count` and `count_by_sql` calls.
    pub counts: usize,
    /// Raw statements received through the SQL interface, in order.
    pub statements: Vec<String>,
}

/// A query engine over an in-memory vector of records.
///
/// Raw SQL is not interpreted beyond its trailing limit clause: every statement
/// selects all records, in insertion order.
#[derive(Debug)]
pub struct MemorySource<T, F = MatchAll> {
    records: Vec<T>,
    dialect: Dialect,
    failure: Option<String>,
    stats: SourceStats,
    filter: PhantomData<fn(&F)>,
}

impl<T, F> MemorySource<T, F> {
    /// Creates a source serving `records`.
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            dialect: Dialect::default(),
            failure: None,
            stats: SourceStats::default(),
            filter: PhantomData,
        }
    }

    /// Sets the dialect reported to `paginate_by_sql`.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Makes every subsequent call fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Returns the calls received so far.
    #[inline]
    pub fn stats(&self) -> &SourceStats {
        &self.stats
    }

    /// Returns the served records.
    #[inline]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    fn check_failure(&self) -> Result<(), MemoryError> {
        match &self.failure {
            Some(message) => Err(MemoryError::Injected(message.clone())),
            None => Ok(()),
        }
    }
}

impl<T: Clone, F> MemorySource<T, F> {
    fn window<'a>(records: impl Iterator<Item = &'a T>, window: Window) -> Vec<T>
    where
        T: 'a,
    {
        records
            .skip(usize::try_from(window.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(window.limit).unwrap_or(0))
            .cloned()
            .collect()
    }
}

impl<T, F> PageSource for MemorySource<T, F>
where
    T: Clone + Send + Sync,
    F: RecordFilter<T>,
{
    type Error = MemoryError;
    type Filter = F;
    type Item = T;

    async fn fetch(&mut self, filter: &F, window: Window) -> Result<Vec<T>, MemoryError> {
        self.stats.fetches.push(window);
        self.check_failure()?;

        let matching = self.records.iter().filter(|record| filter.matches(record));
        Ok(Self::window(matching, window))
    }

    async fn count(&mut self, filter: &F) -> Result<i64, MemoryError> {
        self.stats.counts += 1;
        self.check_failure()?;

        let count = self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .count();
        Ok(count as i64)
    }
}

impl<T, F> SqlSource<T> for MemorySource<T, F>
where
    T: Clone + Send + Sync,
{
    type Error = MemoryError;

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn fetch_by_sql(&mut self, sql: &str) -> Result<Vec<T>, MemoryError> {
        self.stats.statements.push(sql.to_owned());
        self.check_failure()?;

        let captures = LIMIT_CLAUSE
            .captures(sql)
            .ok_or_else(|| MemoryError::MissingLimit(sql.to_owned()))?;
        let number = |names: [&str; 2]| {
            names
                .iter()
                .find_map(|name| captures.name(name))
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .unwrap_or(0)
        };
        let window = Window {
            offset: number(["offset", "ora_offset"]),
            limit: number(["limit", "ora_limit"]),
        };

        Ok(Self::window(self.records.iter(), window))
    }

    async fn count_by_sql(&mut self, sql: &str) -> Result<i64, MemoryError> {
        self.stats.statements.push(sql.to_owned());
        self.stats.counts += 1;
        self.check_failure()?;

        Ok(self.records.len() as i64)
    }
}
