//! Error types and utilities for pagination.

use std::borrow::Cow;

/// Type-erased error type for adapter failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for all pagination operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "pagination errors should be handled appropriately"]
pub enum PageError {
    /// Invalid pagination configuration.
    ///
    /// Raised for a non-positive per-page size after defaulting, a negative
    /// total entries override, or an inconsistent [`PaginateConfig`].
    ///
    /// [`PaginateConfig`]: crate::PaginateConfig
    #[error("Invalid pagination config: {0}")]
    InvalidConfig(Cow<'static, str>),

    /// Page metadata was read before the total number of entries was known.
    #[error("Total entries count has not been resolved yet")]
    MissingTotalCount,

    /// The total number of entries was already resolved for this page.
    #[error("Total entries count has already been set")]
    TotalCountAlreadySet,

    /// The underlying query engine failed to fetch or count records.
    #[error("Query error: {0}")]
    Query(BoxError),
}

impl PageError {
    /// Creates an [`InvalidConfig`] error with the given message.
    ///
    /// [`InvalidConfig`]: PageError::InvalidConfig
    #[inline]
    pub fn invalid_config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Wraps an adapter error.
    #[inline]
    pub fn query(error: impl Into<BoxError>) -> Self {
        Self::Query(error.into())
    }

    /// Returns whether this error stems from misuse of the API rather than
    /// from the query engine.
    ///
    /// These errors are not recoverable by retrying the same call.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            PageError::InvalidConfig(_)
                | PageError::MissingTotalCount
                | PageError::TotalCountAlreadySet
        )
    }
}

/// Specialized [`Result`] type for pagination operations.
pub type PageResult<T, E = PageError> = Result<T, E>;
