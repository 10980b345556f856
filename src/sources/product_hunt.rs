use crate::fetcher::Fetcher;
use crate::recency;
use crate::sources::feed::{parse_feed_body, TimestampFields};
use crate::sources::ContentSource;
use crate::types::{NormalizedItem, Result, SingleFeedConfig};
use async_trait::async_trait;
use tracing::{debug, info};

/// Single-feed adapter for the Product Hunt launch feed. Same mechanics as
/// the generic feed adapter with a larger per-fetch cap and no timestamp
/// fallback, since the endpoint's format is fixed and known.
pub struct ProductHuntSource {
    config: SingleFeedConfig,
    days_back: i64,
}

impl ProductHuntSource {
    pub fn new(config: SingleFeedConfig, days_back: i64) -> Self {
        Self { config, days_back }
    }
}

#[async_trait]
impl ContentSource for ProductHuntSource {
    fn name(&self) -> &str {
        "Product Hunt"
    }

    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<NormalizedItem>> {
        debug!("fetching feed: {}", self.config.feed_url);
        let body = fetcher.get_text(&self.config.feed_url).await?;
        let items = parse_feed_body(
            &body,
            &self.config.feed_url,
            recency::window_start(self.days_back),
            self.config.max_entries,
            TimestampFields::PublishedOnly,
        )?;

        info!("collected {} items from Product Hunt", items.len());
        Ok(items)
    }
}
