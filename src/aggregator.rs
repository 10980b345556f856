use crate::fetcher::Fetcher;
use crate::sources::{
    ContentSource, FeedSource, HackerNewsSource, ProductHuntSource, RedditSource,
};
use crate::types::{
    AggregatorError, CollectionReport, CollectorConfig, Result, SourceOutcome,
};
use futures::future::join_all;
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

/// Runs every configured source and concatenates their output in a fixed
/// order. A failing source contributes zero items and a recorded outcome;
/// collection itself never fails.
pub struct ContentAggregator {
    fetcher: Fetcher,
    sources: Vec<Box<dyn ContentSource>>,
    deadline: Option<Duration>,
}

impl ContentAggregator {
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch.clone())?;

        let mut feeds = Vec::new();
        for url in &config.feeds {
            match Url::parse(url) {
                Ok(_) => feeds.push(url.clone()),
                Err(e) => warn!("skipping invalid feed URL {}: {}", url, e),
            }
        }

        let concurrency = config.max_concurrent_requests;
        // Fixed source order; aggregator output is the concatenation of these.
        let sources: Vec<Box<dyn ContentSource>> = vec![
            Box::new(FeedSource::new(feeds, config.days_back, concurrency)),
            Box::new(HackerNewsSource::new(config.hacker_news.clone(), concurrency)),
            Box::new(RedditSource::new(config.reddit.clone(), concurrency)),
            Box::new(ProductHuntSource::new(
                config.product_hunt.clone(),
                config.days_back,
            )),
        ];

        Ok(Self {
            fetcher,
            sources,
            deadline: config.deadline,
        })
    }

    /// Collect from all sources concurrently. The returned report preserves
    /// source order and records a per-source outcome, so "zero items
    /// collected" is a visible state rather than an error.
    pub async fn collect_all(&self) -> CollectionReport {
        let runs = self.sources.iter().map(|source| {
            let fetcher = &self.fetcher;
            async move {
                let name = source.name().to_string();
                let result = match self.deadline {
                    Some(deadline) => {
                        match tokio::time::timeout(deadline, source.collect(fetcher)).await {
                            Ok(result) => result,
                            // Dropping the timed-out future aborts its
                            // in-flight request and any pending backoff sleep.
                            Err(_) => Err(AggregatorError::General(format!(
                                "run deadline of {:?} exceeded",
                                deadline
                            ))),
                        }
                    }
                    None => source.collect(fetcher).await,
                };
                (name, result)
            }
        });

        let mut items = Vec::new();
        let mut outcomes = Vec::new();
        for (name, result) in join_all(runs).await {
            match result {
                Ok(source_items) => {
                    outcomes.push(SourceOutcome {
                        source: name,
                        count: source_items.len(),
                        error: None,
                    });
                    items.extend(source_items);
                }
                Err(e) => {
                    error!("source {} failed: {}", name, e);
                    outcomes.push(SourceOutcome {
                        source: name,
                        count: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!("total items collected: {}", items.len());
        if items.is_empty() {
            warn!("no items collected from any source");
        }

        CollectionReport { items, outcomes }
    }
}
