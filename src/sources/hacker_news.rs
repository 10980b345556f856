use crate::fetcher::Fetcher;
use crate::sources::{title_or_placeholder, truncate_summary, ContentSource};
use crate::types::{HackerNewsConfig, NormalizedItem, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{error, info};

const SOURCE_NAME: &str = "Hacker News";

/// Two-level story adapter: one listing fetch for the ranked id list, then
/// one fetch per id. A failing id is logged and skipped; it never aborts the
/// remaining fetches.
pub struct HackerNewsSource {
    config: HackerNewsConfig,
    concurrency: usize,
}

/// Item payload as served by the story API. Fields the API omits for some
/// item kinds are all optional.
#[derive(Debug, Deserialize)]
pub(crate) struct HnItem {
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub score: Option<i64>,
    pub time: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub descendants: Option<i64>,
}

impl HackerNewsSource {
    pub fn new(config: HackerNewsConfig, concurrency: usize) -> Self {
        Self {
            config,
            concurrency: concurrency.max(1),
        }
    }

    async fn fetch_story(&self, fetcher: &Fetcher, id: u64) -> Result<HnItem> {
        let url = format!("{}/item/{}.json", self.config.api_base, id);
        // Per-item fetches use the shorter timeout; the fan-out is wide.
        fetcher.get_json(&url, fetcher.item_timeout()).await
    }
}

#[async_trait]
impl ContentSource for HackerNewsSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<NormalizedItem>> {
        let list_url = format!("{}/topstories.json", self.config.api_base);
        let mut ids: Vec<u64> = fetcher.get_json(&list_url, fetcher.timeout()).await?;
        ids.truncate(self.config.list_limit);

        let results: Vec<(u64, Result<HnItem>)> = stream::iter(
            ids.into_iter().take(self.config.story_limit),
        )
        .map(|id| async move { (id, self.fetch_story(fetcher, id).await) })
        .buffered(self.concurrency)
        .collect()
        .await;

        let mut items = Vec::new();
        for (id, result) in results {
            match result {
                Ok(story) => {
                    if let Some(item) = normalize_story(id, story) {
                        items.push(item);
                    }
                }
                Err(e) => {
                    error!("error fetching HN story {}: {}", id, e);
                }
            }
        }

        info!("collected {} items from Hacker News", items.len());
        Ok(items)
    }
}

/// Convert a story payload into the common schema. Non-story items (comments,
/// polls surfacing in the top listing) are excluded.
pub(crate) fn normalize_story(id: u64, story: HnItem) -> Option<NormalizedItem> {
    if story.kind.as_deref() != Some("story") {
        return None;
    }

    // Every included item gets a usable link: the submitted URL when present,
    // otherwise the item's discussion page.
    let link = story
        .url
        .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", id));

    let published = story
        .time
        .and_then(|t| Utc.timestamp_opt(t, 0).single());

    Some(NormalizedItem {
        title: title_or_placeholder(story.title),
        link,
        summary: story
            .text
            .map(|t| truncate_summary(&t))
            .unwrap_or_default(),
        source: SOURCE_NAME.to_string(),
        published,
        score: Some(story.score.unwrap_or(0)),
        engagement_count: story.descendants,
    })
}
