#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for page request resolution.
///
/// Use this target for logging how raw page options are normalised.
pub const TRACING_TARGET_REQUEST: &str = "pagekit_core::request";

/// Tracing target for pagination queries.
///
/// Use this target for logging item fetches, count queries and total resolution.
pub const TRACING_TARGET_QUERY: &str = "pagekit_core::query";

mod config;
mod error;
mod page;
mod paginate;
pub mod prelude;
mod query;
pub mod request;
mod source;
pub mod sql;

pub use crate::config::PaginateConfig;
pub use crate::error::{BoxError, PageError, PageResult};
pub use crate::page::{Page, PageInfo, Pager};
pub use crate::paginate::{for_each_item, paginate, paginate_by_sql};
pub use crate::query::PageQuery;
pub use crate::request::{PageOptions, PageRequest, Window};
pub use crate::source::{PageSource, SqlSource};
pub use crate::sql::{Dialect, derive_count_query};
