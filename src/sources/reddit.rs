use crate::fetcher::Fetcher;
use crate::sources::{title_or_placeholder, truncate_summary, ContentSource};
use crate::types::{NormalizedItem, RedditConfig, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{error, info};

/// Listing adapter: weekly-top posts per subreddit, filtered by comment
/// count so the collection surfaces items with actual discussion rather than
/// bare link-drops. A failing subreddit is logged and skipped.
pub struct RedditSource {
    config: RedditConfig,
    concurrency: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    pub children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingChild {
    pub data: Post,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Post {
    pub title: Option<String>,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub selftext: Option<String>,
    pub score: Option<i64>,
    pub num_comments: Option<i64>,
    pub created_utc: Option<f64>,
}

impl RedditSource {
    pub fn new(config: RedditConfig, concurrency: usize) -> Self {
        Self {
            config,
            concurrency: concurrency.max(1),
        }
    }

    async fn fetch_subreddit(&self, fetcher: &Fetcher, subreddit: &str) -> Result<Listing> {
        let url = format!(
            "{}/r/{}/top.json?t=week&limit={}",
            self.config.api_base, subreddit, self.config.per_subreddit_limit
        );
        fetcher.get_json(&url, fetcher.timeout()).await
    }
}

#[async_trait]
impl ContentSource for RedditSource {
    fn name(&self) -> &str {
        "Reddit"
    }

    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<NormalizedItem>> {
        let results: Vec<(String, Result<Listing>)> =
            stream::iter(self.config.subreddits.iter().cloned())
                .map(|sub| async move {
                    let result = self.fetch_subreddit(fetcher, &sub).await;
                    (sub, result)
                })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut items = Vec::new();
        for (sub, result) in results {
            match result {
                Ok(listing) => {
                    items.extend(normalize_listing(
                        &sub,
                        listing,
                        self.config.min_comments,
                        &self.config.api_base,
                    ));
                }
                Err(e) => {
                    error!("error fetching r/{}: {}", sub, e);
                }
            }
        }

        info!(
            "collected {} items from {} subreddits",
            items.len(),
            self.config.subreddits.len()
        );
        Ok(items)
    }
}

/// Normalize one subreddit listing, applying the engagement threshold and the
/// composite "Reddit/r/{sub}" source label.
pub(crate) fn normalize_listing(
    subreddit: &str,
    listing: Listing,
    min_comments: i64,
    api_base: &str,
) -> Vec<NormalizedItem> {
    let label = format!("Reddit/r/{}", subreddit);

    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| post.num_comments.unwrap_or(0) >= min_comments)
        .map(|post| {
            let link = post
                .url
                .filter(|u| !u.is_empty())
                .or_else(|| post.permalink.map(|p| format!("{}{}", api_base, p)))
                .unwrap_or_default();

            let published = post
                .created_utc
                .and_then(|ts| Utc.timestamp_opt(ts as i64, 0).single());

            NormalizedItem {
                title: title_or_placeholder(post.title),
                link,
                summary: post
                    .selftext
                    .map(|t| truncate_summary(&t))
                    .unwrap_or_default(),
                source: label.clone(),
                published,
                score: post.score,
                engagement_count: post.num_comments,
            }
        })
        .collect()
}
