//! Page request resolution.
//!
//! Raw [`PageOptions`] are normalised into a [`PageRequest`], which in turn
//! yields the offset/limit [`Window`] handed to query engines.

mod options;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use self::options::PageOptions;
use crate::{PageError, PageResult, PaginateConfig, TRACING_TARGET_REQUEST};

/// An offset/limit window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Window {
    /// Number of records to skip.
    pub offset: i64,
    /// Maximum number of records to return.
    pub limit: i64,
}

/// A resolved page request.
///
/// Both fields are positive. Construct one with [`PageRequest::resolve`] or
/// [`PageRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PageRequest {
    page: i64,
    per_page: i64,
}

impl PageRequest {
    /// Creates a request for the given page and page size.
    ///
    /// A page below 1 is coerced to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidConfig`] if `per_page` is not positive.
    pub fn new(page: i64, per_page: i64) -> PageResult<Self> {
        if per_page <= 0 {
            return Err(PageError::invalid_config(format!(
                "per_page must be positive, got {per_page}"
            )));
        }

        Ok(Self {
            page: page.max(1),
            per_page,
        })
    }

    /// Resolves raw options against the configured defaults.
    ///
    /// - a missing or non-positive page becomes page 1
    /// - a missing per-page size falls back to `config.default_per_page`
    /// - a per-page size above `config.max_per_page` is clamped
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidConfig`] if the per-page size is not
    /// positive after defaulting, or if a negative total entries override was
    /// supplied.
    #[tracing::instrument(skip(config), target = TRACING_TARGET_REQUEST)]
    pub fn resolve(options: &PageOptions, config: &PaginateConfig) -> PageResult<Self> {
        if let Some(total) = options.total_entries
            && total < 0
        {
            return Err(PageError::invalid_config(format!(
                "total_entries must not be negative, got {total}"
            )));
        }

        let mut per_page = options.per_page.unwrap_or(config.default_per_page);
        if per_page > config.max_per_page && config.max_per_page > 0 {
            tracing::debug!(
                target: TRACING_TARGET_REQUEST,
                requested = per_page,
                max_per_page = config.max_per_page,
                "Clamping per-page size"
            );
            per_page = config.max_per_page;
        }

        let request = Self::new(options.page.unwrap_or(1), per_page)?;

        tracing::trace!(
            target: TRACING_TARGET_REQUEST,
            page = request.page,
            per_page = request.per_page,
            offset = request.offset(),
            "Resolved page request"
        );

        Ok(request)
    }

    /// Returns the requested page number (1-based).
    #[inline]
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Returns the number of items per page.
    #[inline]
    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Returns the number of records to skip.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Returns the maximum number of records to fetch.
    #[inline]
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Returns the offset/limit window for this request.
    #[inline]
    pub fn window(&self) -> Window {
        Window {
            offset: self.offset(),
            limit: self.limit(),
        }
    }

    /// Returns the request for the following page.
    #[inline]
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(options: PageOptions) -> PageResult<PageRequest> {
        PageRequest::resolve(&options, &PaginateConfig::default())
    }

    #[test]
    fn resolve_defaults() {
        let request = resolve(PageOptions::new()).expect("defaults should resolve");
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), 30);
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 30);
    }

    #[test]
    fn resolve_uses_configured_default() {
        let config = PaginateConfig::new().with_default_per_page(5);
        let request = PageRequest::resolve(&PageOptions::new().with_page(3), &config)
            .expect("request should resolve");
        assert_eq!(request.per_page(), 5);
        assert_eq!(request.offset(), 10);
    }

    #[test]
    fn resolve_coerces_page() {
        let request = resolve(PageOptions::new().with_page(0)).expect("page 0 should resolve");
        assert_eq!(request.page(), 1);

        let request = resolve(PageOptions::new().with_page(-4)).expect("page -4 should resolve");
        assert_eq!(request.page(), 1);

        let request = resolve(PageOptions::new().with_page_str("last"))
            .expect("non-numeric page should resolve");
        assert_eq!(request.page(), 1);
    }

    #[test]
    fn resolve_rejects_non_positive_per_page() {
        let err = resolve(PageOptions::new().with_per_page(0)).unwrap_err();
        assert!(matches!(err, PageError::InvalidConfig(_)));

        let err = resolve(PageOptions::new().with_per_page(-10)).unwrap_err();
        assert!(matches!(err, PageError::InvalidConfig(_)));

        let config = PaginateConfig::new().with_default_per_page(0);
        let err = PageRequest::resolve(&PageOptions::new(), &config).unwrap_err();
        assert!(matches!(err, PageError::InvalidConfig(_)));
    }

    #[test]
    fn resolve_rejects_negative_total() {
        let err = resolve(PageOptions::new().with_total_entries(-1)).unwrap_err();
        assert!(matches!(err, PageError::InvalidConfig(_)));
    }

    #[test]
    fn resolve_clamps_per_page() {
        let config = PaginateConfig::new().with_max_per_page(100);
        let request = PageRequest::resolve(&PageOptions::new().with_per_page(5000), &config)
            .expect("oversized per_page should clamp");
        assert_eq!(request.per_page(), 100);
    }

    #[test]
    fn offset_follows_page() {
        for page in 1..=50 {
            for per_page in [1, 7, 30, 100] {
                let request = PageRequest::new(page, per_page).expect("request should build");
                assert_eq!(request.offset(), (page - 1) * per_page);
                assert_eq!(
                    request.window(),
                    Window {
                        offset: (page - 1) * per_page,
                        limit: per_page
                    }
                );
            }
        }
    }

    #[test]
    fn next_request() {
        let request = PageRequest::new(2, 10).expect("request should build");
        let next = request.next();
        assert_eq!(next.page(), 3);
        assert_eq!(next.offset(), 20);
    }
}
