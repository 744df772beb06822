//! Page collections annotated with pagination metadata.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{PageError, PageRequest, PageResult, TRACING_TARGET_QUERY, Window};

/// Collects the items of a page while it is being built.
///
/// Handed to the provider passed to [`Page::create`]. The provider reads the
/// [`window`](Pager::window), supplies the fetched items through
/// [`replace`](Pager::replace), and may record the total number of entries
/// through [`set_total_entries`](Pager::set_total_entries).
#[derive(Debug)]
pub struct Pager<T> {
    request: PageRequest,
    items: Vec<T>,
    total_entries: Option<i64>,
}

impl<T> Pager<T> {
    /// Creates a pager for the given request.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidConfig`] if `total_entries` is negative.
    pub fn new(request: PageRequest, total_entries: Option<i64>) -> PageResult<Self> {
        Ok(Self {
            request,
            items: Vec::new(),
            total_entries: total_entries.map(check_total_entries).transpose()?,
        })
    }

    /// Returns the resolved request.
    #[inline]
    pub fn request(&self) -> PageRequest {
        self.request
    }

    /// Returns the window to fetch.
    #[inline]
    pub fn window(&self) -> Window {
        self.request.window()
    }

    /// Returns the number of records to skip.
    #[inline]
    pub fn offset(&self) -> i64 {
        self.request.offset()
    }

    /// Returns the maximum number of records to fetch.
    #[inline]
    pub fn limit(&self) -> i64 {
        self.request.limit()
    }

    /// Returns the total number of entries, if known.
    #[inline]
    pub fn total_entries(&self) -> Option<i64> {
        self.total_entries
    }

    /// Records the total number of entries.
    ///
    /// A total that is already known is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidConfig`] if `total_entries` is negative.
    pub fn set_total_entries(&mut self, total_entries: i64) -> PageResult<()> {
        let total_entries = check_total_entries(total_entries)?;
        if self.total_entries.is_none() {
            self.total_entries = Some(total_entries);
        }
        Ok(())
    }

    /// Replaces the collected items with the fetched ones.
    ///
    /// Items beyond the limit are dropped. If the total is unknown and the
    /// fetched page is short, the total is inferred as `offset + len`: a short
    /// first page, or a short non-empty later page, must be the last page. An
    /// empty later page says nothing about the total, so it is left unset.
    pub fn replace(&mut self, mut items: Vec<T>) {
        let limit = usize::try_from(self.limit()).unwrap_or(usize::MAX);
        if items.len() > limit {
            tracing::warn!(
                target: TRACING_TARGET_QUERY,
                fetched = items.len(),
                limit,
                "Provider returned more items than the page limit, truncating"
            );
            items.truncate(limit);
        }

        if self.total_entries.is_none()
            && items.len() < limit
            && (self.request.page() == 1 || !items.is_empty())
        {
            let inferred = self.offset().saturating_add(items.len() as i64);
            tracing::trace!(
                target: TRACING_TARGET_QUERY,
                total_entries = inferred,
                "Inferred total entries from a short page"
            );
            self.total_entries = Some(inferred);
        }

        self.items = items;
    }

    /// Finishes building the page.
    pub fn finish(self) -> Page<T> {
        Page {
            items: self.items,
            current_page: self.request.page(),
            per_page: self.request.per_page(),
            total_entries: self.total_entries,
        }
    }
}

/// A page of results with pagination metadata.
///
/// The items are fixed at construction. The total number of entries may be
/// supplied up front or set once later (e.g. after a separate count query);
/// until then every accessor that depends on it fails with
/// [`PageError::MissingTotalCount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    current_page: i64,
    per_page: i64,
    total_entries: Option<i64>,
}

impl<T> Page<T> {
    /// Creates a page by handing a [`Pager`] to the item provider.
    ///
    /// If `total_entries` is supplied it is used verbatim and the provider
    /// cannot override it.
    ///
    /// # Errors
    ///
    /// - [`PageError::InvalidConfig`] if `total_entries` is negative
    /// - any error returned by `provider`
    pub fn create<F>(
        request: PageRequest,
        total_entries: Option<i64>,
        provider: F,
    ) -> PageResult<Self>
    where
        F: FnOnce(&mut Pager<T>) -> PageResult<()>,
    {
        let mut pager = Pager::new(request, total_entries)?;
        provider(&mut pager)?;
        Ok(pager.finish())
    }

    /// Creates a page from already fetched items.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidConfig`] if `total_entries` is negative.
    pub fn new(
        request: PageRequest,
        items: Vec<T>,
        total_entries: Option<i64>,
    ) -> PageResult<Self> {
        let mut pager = Pager::new(request, total_entries)?;
        pager.replace(items);
        Ok(pager.finish())
    }

    /// Creates an empty first page with a total of zero.
    pub fn empty(per_page: i64) -> PageResult<Self> {
        let request = PageRequest::new(1, per_page)?;
        Self::new(request, Vec::new(), Some(0))
    }

    /// Returns the items of this page.
    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page and returns its items.
    #[inline]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns the number of items on this page.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether this page holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the iterator over the items of this page.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Returns the current page number (1-based).
    #[inline]
    pub fn current_page(&self) -> i64 {
        self.current_page
    }

    /// Returns the number of items per page.
    #[inline]
    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Returns the number of records skipped before this page.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.current_page - 1).saturating_mul(self.per_page)
    }

    /// Returns whether the total number of entries is known.
    #[inline]
    pub fn has_total_entries(&self) -> bool {
        self.total_entries.is_some()
    }

    /// Returns the total number of entries across all pages.
    pub fn total_entries(&self) -> PageResult<i64> {
        self.total_entries.ok_or(PageError::MissingTotalCount)
    }

    /// Sets the total number of entries of a page created without one.
    ///
    /// # Errors
    ///
    /// - [`PageError::TotalCountAlreadySet`] if the total is already known
    /// - [`PageError::InvalidConfig`] if `total_entries` is negative
    pub fn set_total_entries(&mut self, total_entries: i64) -> PageResult<()> {
        if self.total_entries.is_some() {
            return Err(PageError::TotalCountAlreadySet);
        }

        self.total_entries = Some(check_total_entries(total_entries)?);
        Ok(())
    }

    /// Returns the total number of pages.
    ///
    /// Zero entries means zero pages.
    pub fn total_pages(&self) -> PageResult<i64> {
        let total = self.total_entries()?;
        if total == 0 {
            return Ok(0);
        }
        Ok((total - 1) / self.per_page + 1)
    }

    /// Returns whether the current page lies beyond the last page.
    ///
    /// The first page of an empty result set is not out of bounds.
    pub fn is_out_of_bounds(&self) -> PageResult<bool> {
        let total_pages = self.total_pages()?;
        Ok(self.current_page > total_pages.max(1))
    }

    /// Returns the previous page number, or `None` on the first page.
    #[inline]
    pub fn previous_page(&self) -> Option<i64> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    /// Returns the next page number, or `None` on or past the last page.
    pub fn next_page(&self) -> PageResult<Option<i64>> {
        let total_pages = self.total_pages()?;
        Ok((self.current_page < total_pages).then(|| self.current_page + 1))
    }

    /// Returns whether more entries follow this page.
    pub fn has_more(&self) -> PageResult<bool> {
        let seen = self.offset().saturating_add(self.items.len() as i64);
        Ok(seen < self.total_entries()?)
    }

    /// Maps the items to a different type, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total_entries: self.total_entries,
        }
    }

    /// Returns a snapshot of the page metadata.
    pub fn info(&self) -> PageResult<PageInfo> {
        Ok(PageInfo {
            current_page: self.current_page,
            per_page: self.per_page,
            total_entries: self.total_entries()?,
            total_pages: self.total_pages()?,
            offset: self.offset(),
            previous_page: self.previous_page(),
            next_page: self.next_page()?,
            out_of_bounds: self.is_out_of_bounds()?,
        })
    }
}

fn check_total_entries(total_entries: i64) -> PageResult<i64> {
    if total_entries < 0 {
        return Err(PageError::invalid_config(format!(
            "total_entries must not be negative, got {total_entries}"
        )));
    }
    Ok(total_entries)
}

impl<T> IntoIterator for Page<T> {
    type IntoIter = std::vec::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Serializable snapshot of page metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Current page number (1-based).
    pub current_page: i64,
    /// Number of items per page.
    pub per_page: i64,
    /// Total number of entries across all pages.
    pub total_entries: i64,
    /// Total number of pages.
    pub total_pages: i64,
    /// Number of records skipped before this page.
    pub offset: i64,
    /// Previous page number, if any.
    pub previous_page: Option<i64>,
    /// Next page number, if any.
    pub next_page: Option<i64>,
    /// Whether the current page lies beyond the last page.
    pub out_of_bounds: bool,
}
