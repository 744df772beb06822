//! Prelude module for pagekit-core.
//!
//! This module re-exports the most commonly used types and traits, making it
//! easy to import everything needed to paginate with a single `use` statement.
//!
//! # Example
//!
//! ```rust
//! use pagekit_core::prelude::*;
//!
//! let request = PageRequest::resolve(&PageOptions::new().with_page(2), &PaginateConfig::default())?;
//! assert_eq!(request.offset(), 30);
//! # Ok::<(), PageError>(())
//! ```

// Requests and configuration
pub use crate::{PageOptions, PageQuery, PageRequest, PaginateConfig, Window};
// Pages
pub use crate::{Page, PageInfo, Pager};
// Adapters and drivers
pub use crate::{Dialect, PageSource, SqlSource, for_each_item, paginate, paginate_by_sql};
// Error types
pub use crate::{PageError, PageResult};
