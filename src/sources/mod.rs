pub mod feed;
pub mod hacker_news;
pub mod product_hunt;
pub mod reddit;

pub use feed::FeedSource;
pub use hacker_news::HackerNewsSource;
pub use product_hunt::ProductHuntSource;
pub use reddit::RedditSource;

use crate::fetcher::Fetcher;
use crate::types::{NormalizedItem, Result, FALLBACK_TITLE, SUMMARY_MAX_CHARS};
use async_trait::async_trait;

/// A source adapter: converts one external API/feed shape into a sequence of
/// [`NormalizedItem`]. Adapters share the fetch client and the output
/// contract, nothing else.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable name used in logs and per-source outcomes.
    fn name(&self) -> &str;

    /// Fetch and normalize this source's items. Failures inside the source
    /// (a single feed, id, or category) are logged and skipped; an `Err` here
    /// means the source as a whole produced nothing.
    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<NormalizedItem>>;
}

/// Truncate free text to the summary budget on a character boundary.
pub(crate) fn truncate_summary(text: &str) -> String {
    text.chars().take(SUMMARY_MAX_CHARS).collect()
}

/// Substitute the placeholder for missing or blank titles; an item is never
/// dropped for lacking one.
pub(crate) fn title_or_placeholder(title: Option<String>) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => t,
        _ => FALLBACK_TITLE.to_string(),
    }
}
