//! Sample records with a typed filter.

use serde::{Deserialize, Serialize};

use super::RecordFilter;

/// A sample record for pagination tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Sequential identifier, starting at 1.
    pub id: i64,
    /// Author name.
    pub author: String,
    /// Whether the article is published.
    pub published: bool,
}

/// Filter options for articles.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFilter {
    /// Filter by author name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Filter by publication status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl ArticleFilter {
    /// Creates a new empty filter.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by author.
    #[inline]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Filters by publication status.
    #[inline]
    pub fn with_published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    /// Returns whether any filter is active.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.published.is_none()
    }
}

impl RecordFilter<Article> for ArticleFilter {
    fn matches(&self, article: &Article) -> bool {
        self.author
            .as_deref()
            .is_none_or(|author| article.author == author)
            && self
                .published
                .is_none_or(|published| article.published == published)
    }
}

/// Builds `count` articles cycling through three authors.
///
/// Every even id is published.
pub fn sample_articles(count: i64) -> Vec<Article> {
    const AUTHORS: [&str; 3] = ["ada", "grace", "linus"];

    (1..=count)
        .map(|id| Article {
            id,
            author: AUTHORS[(id as usize - 1) % AUTHORS.len()].to_owned(),
            published: id % 2 == 0,
        })
        .collect()
}
