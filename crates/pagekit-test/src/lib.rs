#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod mock;
mod tracing;

pub use mock::{
    Article, ArticleFilter, MatchAll, MemoryError, MemorySource, RecordFilter, SourceStats,
    sample_articles,
};
pub use tracing::init_tracing;
