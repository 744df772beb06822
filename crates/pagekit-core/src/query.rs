//! Paginated query descriptors.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{PageOptions, PageRequest, PageResult, PaginateConfig};

/// A paginated query: what to fetch and which page of it.
///
/// The filter is a typed value understood by a [`PageSource`]; there is one
/// filter type per source, built with ordinary builder methods rather than
/// derived from method names.
///
/// ```rust
/// use pagekit_core::PageQuery;
///
/// let query = PageQuery::new("published").page(2).per_page(10);
/// assert_eq!(query.options().page, Some(2));
/// ```
///
/// [`PageSource`]: crate::PageSource
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PageQuery<F> {
    /// The filter selecting records.
    pub filter: F,
    /// The requested page.
    #[serde(flatten)]
    pub options: PageOptions,
}

impl<F> PageQuery<F> {
    /// Creates a query for the first page of `filter`.
    #[inline]
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            options: PageOptions::default(),
        }
    }

    /// Creates a query from a filter and raw options.
    #[inline]
    pub fn with_options(filter: F, options: PageOptions) -> Self {
        Self { filter, options }
    }

    /// Sets the requested page.
    #[inline]
    pub fn page(mut self, page: i64) -> Self {
        self.options.page = Some(page);
        self
    }

    /// Sets the number of items per page.
    #[inline]
    pub fn per_page(mut self, per_page: i64) -> Self {
        self.options.per_page = Some(per_page);
        self
    }

    /// Sets the known total number of entries, skipping the count query.
    #[inline]
    pub fn total_entries(mut self, total_entries: i64) -> Self {
        self.options.total_entries = Some(total_entries);
        self
    }

    /// Returns the filter.
    #[inline]
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Returns the raw page options.
    #[inline]
    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    /// Resolves the page options against `config`.
    #[inline]
    pub fn resolve(&self, config: &PaginateConfig) -> PageResult<PageRequest> {
        PageRequest::resolve(&self.options, config)
    }

    /// Replaces the filter, keeping the page options.
    pub fn map_filter<G, M>(self, f: M) -> PageQuery<G>
    where
        M: FnOnce(F) -> G,
    {
        PageQuery {
            filter: f(self.filter),
            options: self.options,
        }
    }
}
