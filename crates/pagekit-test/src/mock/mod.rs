//! In-memory query engine for testing pagination.
//!
//! [`MemorySource`] implements both adapter traits of pagekit-core over a
//! vector of records, counting every call so tests can assert which queries
//! pagination issued.

mod articles;
mod memory;

pub use articles::{Article, ArticleFilter, sample_articles};
pub use memory::{MatchAll, MemoryError, MemorySource, RecordFilter, SourceStats};
