//! Pagination defaults threaded through every pagination call.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{PageError, PageResult, TRACING_TARGET_REQUEST};

/// Default number of items per page.
pub const DEFAULT_PER_PAGE: i64 = 30;

/// Default upper bound for the number of items per page.
pub const MAX_PER_PAGE: i64 = 1000;

/// Pagination defaults.
///
/// There is no process-wide default: callers construct one configuration and
/// pass it explicitly to [`PageRequest::resolve`] and the pagination drivers.
///
/// ## Example
///
/// ```rust
/// use pagekit_core::PaginateConfig;
///
/// let config = PaginateConfig::new().with_default_per_page(25);
/// assert!(config.validate().is_ok());
/// ```
///
/// [`PageRequest::resolve`]: crate::PageRequest::resolve
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "pagination configurations must be passed to pagination calls"]
pub struct PaginateConfig {
    /// Number of items per page when the request does not specify one
    #[cfg_attr(
        feature = "config",
        arg(
            long = "paginate-default-per-page",
            env = "PAGINATE_DEFAULT_PER_PAGE",
            default_value = "30"
        )
    )]
    #[serde(default = "default_per_page")]
    pub default_per_page: i64,

    /// Upper bound for the number of items per page
    #[cfg_attr(
        feature = "config",
        arg(
            long = "paginate-max-per-page",
            env = "PAGINATE_MAX_PER_PAGE",
            default_value = "1000"
        )
    )]
    #[serde(default = "max_per_page")]
    pub max_per_page: i64,
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

fn max_per_page() -> i64 {
    MAX_PER_PAGE
}

impl PaginateConfig {
    /// Creates a configuration with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default number of items per page.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_REQUEST)]
    pub fn with_default_per_page(mut self, default_per_page: i64) -> Self {
        tracing::debug!(target: TRACING_TARGET_REQUEST, default_per_page, "Setting default per-page size");
        self.default_per_page = default_per_page;
        self
    }

    /// Sets the upper bound for the number of items per page.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_REQUEST)]
    pub fn with_max_per_page(mut self, max_per_page: i64) -> Self {
        tracing::debug!(target: TRACING_TARGET_REQUEST, max_per_page, "Setting max per-page size");
        self.max_per_page = max_per_page;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> PageResult<()> {
        if self.max_per_page <= 0 {
            return Err(PageError::invalid_config(format!(
                "max_per_page must be positive, got {}",
                self.max_per_page
            )));
        }

        if !(1..=self.max_per_page).contains(&self.default_per_page) {
            return Err(PageError::invalid_config(format!(
                "default_per_page must be between 1 and {}, got {}",
                self.max_per_page, self.default_per_page
            )));
        }

        Ok(())
    }
}

impl Default for PaginateConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

impl fmt::Debug for PaginateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginateConfig")
            .field("default_per_page", &self.default_per_page)
            .field("max_per_page", &self.max_per_page)
            .finish()
    }
}

impl fmt::Display for PaginateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PaginateConfig(default_per_page: {}, max_per_page: {})",
            self.default_per_page, self.max_per_page
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PaginateConfig::default();
        assert_eq!(config.default_per_page, 30);
        assert_eq!(config.max_per_page, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let config = PaginateConfig::new()
            .with_default_per_page(10)
            .with_max_per_page(50);

        assert_eq!(config.default_per_page, 10);
        assert_eq!(config.max_per_page, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation() {
        let zero_default = PaginateConfig::new().with_default_per_page(0);
        assert!(matches!(
            zero_default.validate(),
            Err(PageError::InvalidConfig(_))
        ));

        let above_max = PaginateConfig::new()
            .with_max_per_page(20)
            .with_default_per_page(30);
        assert!(above_max.validate().is_err());

        let negative_max = PaginateConfig::new().with_max_per_page(-1);
        assert!(negative_max.validate().is_err());
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: PaginateConfig = serde_json::from_str(r#"{"default_per_page": 15}"#)
            .expect("config should deserialize");
        assert_eq!(config.default_per_page, 15);
        assert_eq!(config.max_per_page, MAX_PER_PAGE);
    }

    #[test]
    fn display() {
        let config = PaginateConfig::default();
        assert_eq!(
            config.to_string(),
            "PaginateConfig(default_per_page: 30, max_per_page: 1000)"
        );
    }
}
