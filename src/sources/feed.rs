use crate::fetcher::Fetcher;
use crate::recency;
use crate::sources::{title_or_placeholder, truncate_summary, ContentSource};
use crate::types::{AggregatorError, NormalizedItem, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

/// Which entry fields may carry the publish time. Feed dialects differ in
/// where they put it, so the extraction strategy is declared once per source
/// instead of probed field-by-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFields {
    /// Try `published`, then fall back to `updated` (RSS vs Atom vintage).
    PublishedOrUpdated,
    /// `published` only, for sources whose format is fixed and known.
    PublishedOnly,
}

/// Syndication feed adapter: fetches a set of RSS/Atom feeds and normalizes
/// their most recent entries. A failing feed is skipped, never fatal.
pub struct FeedSource {
    feeds: Vec<String>,
    days_back: i64,
    max_entries: usize,
    concurrency: usize,
}

impl FeedSource {
    pub fn new(feeds: Vec<String>, days_back: i64, concurrency: usize) -> Self {
        Self {
            feeds,
            days_back,
            max_entries: 10,
            concurrency: concurrency.max(1),
        }
    }

    async fn fetch_one(
        &self,
        fetcher: &Fetcher,
        feed_url: &str,
        window_start: DateTime<Utc>,
    ) -> Result<Vec<NormalizedItem>> {
        debug!("fetching feed: {}", feed_url);
        let body = fetcher.get_text(feed_url).await?;
        parse_feed_body(
            &body,
            feed_url,
            window_start,
            self.max_entries,
            TimestampFields::PublishedOrUpdated,
        )
    }
}

#[async_trait]
impl ContentSource for FeedSource {
    fn name(&self) -> &str {
        "RSS feeds"
    }

    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<NormalizedItem>> {
        let window_start = recency::window_start(self.days_back);

        let results: Vec<(String, Result<Vec<NormalizedItem>>)> =
            stream::iter(self.feeds.iter().cloned())
                .map(|url| async move {
                    let result = self.fetch_one(fetcher, &url, window_start).await;
                    (url, result)
                })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut items = Vec::new();
        for (url, result) in results {
            match result {
                Ok(feed_items) => {
                    debug!("feed {} contributed {} items", url, feed_items.len());
                    items.extend(feed_items);
                }
                Err(e) => {
                    error!("error fetching RSS feed {}: {}", url, e);
                }
            }
        }

        info!("collected {} items from {} feeds", items.len(), self.feeds.len());
        Ok(items)
    }
}

/// Parse raw feed bytes and normalize up to `max_entries` recent entries.
/// Shared by the multi-feed and single-feed adapters.
pub(crate) fn parse_feed_body(
    body: &str,
    feed_url: &str,
    window_start: DateTime<Utc>,
    max_entries: usize,
    timestamps: TimestampFields,
) -> Result<Vec<NormalizedItem>> {
    if !looks_like_feed(body) {
        return Err(AggregatorError::Parse(format!(
            "response from {} does not look like an RSS/Atom feed",
            feed_url
        )));
    }

    let feed = parser::parse(body.as_bytes())
        .map_err(|e| AggregatorError::Parse(format!("failed to parse {}: {}", feed_url, e)))?;

    // Every item from this fetch inherits the feed title as its source label;
    // the URL stands in when the feed does not declare one.
    let label = feed
        .title
        .map(|t| t.content)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| feed_url.to_string());

    let mut items = Vec::new();
    for entry in feed.entries.into_iter().take(max_entries) {
        let published = match timestamps {
            TimestampFields::PublishedOrUpdated => entry.published.or(entry.updated),
            TimestampFields::PublishedOnly => entry.published,
        };

        if !recency::is_recent(published, window_start) {
            continue;
        }

        // Summary strategies in preference order: the plain summary field,
        // then the structured content body.
        let summary = entry
            .summary
            .map(|s| s.content)
            .filter(|s| !s.is_empty())
            .or_else(|| entry.content.and_then(|c| c.body))
            .map(|s| truncate_summary(&s))
            .unwrap_or_default();

        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        items.push(NormalizedItem {
            title: title_or_placeholder(entry.title.map(|t| t.content)),
            link,
            summary,
            source: label.clone(),
            published,
            score: None,
            engagement_count: None,
        });
    }

    Ok(items)
}

/// Content sniff for feed detection. Real-world feeds mislabel their
/// Content-Type, so the body is checked for RSS/Atom markers instead.
pub(crate) fn looks_like_feed(content: &str) -> bool {
    let head: String = content.chars().take(2048).collect::<String>().to_lowercase();
    head.contains("<rss")
        || head.contains("<feed")
        || head.contains("<channel")
        || head.contains("xmlns=\"http://www.w3.org/2005/atom\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FALLBACK_TITLE;
    use chrono::TimeZone;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Product Blog</title>
    <link>https://example.com</link>
    <item>
      <title>Fresh post</title>
      <link>https://example.com/fresh</link>
      <description>A recent article.</description>
      <pubDate>Wed, 10 Jan 2024 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Stale post</title>
      <link>https://example.com/stale</link>
      <description>An old article.</description>
      <pubDate>Sun, 01 Jan 2023 09:00:00 GMT</pubDate>
    </item>
    <item>
      <link>https://example.com/undated</link>
      <description>No date, no title.</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom Feed</title>
  <entry>
    <title>Atom entry</title>
    <link href="https://example.com/atom-entry"/>
    <summary>Atom summary.</summary>
    <updated>2024-01-10T09:00:00Z</updated>
  </entry>
</feed>"#;

    fn window() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()
    }

    #[test]
    fn filters_old_entries_and_keeps_undated_ones() {
        let items = parse_feed_body(
            RSS_SAMPLE,
            "https://example.com/feed",
            window(),
            10,
            TimestampFields::PublishedOrUpdated,
        )
        .unwrap();

        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert!(titles.contains(&"Fresh post"));
        assert!(!titles.contains(&"Stale post"));
        // The undated entry survives and gets the placeholder title.
        assert!(titles.contains(&FALLBACK_TITLE));
    }

    #[test]
    fn items_inherit_the_feed_title_as_source() {
        let items = parse_feed_body(
            RSS_SAMPLE,
            "https://example.com/feed",
            window(),
            10,
            TimestampFields::PublishedOrUpdated,
        )
        .unwrap();

        assert!(items.iter().all(|i| i.source == "Example Product Blog"));
    }

    #[test]
    fn atom_entries_use_the_updated_fallback() {
        let items = parse_feed_body(
            ATOM_SAMPLE,
            "https://example.com/atom",
            window(),
            10,
            TimestampFields::PublishedOrUpdated,
        )
        .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Atom entry");
        assert_eq!(items[0].link, "https://example.com/atom-entry");
        assert!(items[0].published.is_some());
    }

    #[test]
    fn published_only_mode_ignores_updated() {
        let items = parse_feed_body(
            ATOM_SAMPLE,
            "https://example.com/atom",
            window(),
            10,
            TimestampFields::PublishedOnly,
        )
        .unwrap();

        // Without the fallback the entry has no timestamp, which keeps it
        // but leaves `published` empty.
        assert_eq!(items.len(), 1);
        assert!(items[0].published.is_none());
    }

    #[test]
    fn entry_cap_is_applied() {
        let items = parse_feed_body(
            RSS_SAMPLE,
            "https://example.com/feed",
            window(),
            1,
            TimestampFields::PublishedOrUpdated,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn non_feed_content_is_a_parse_error() {
        let result = parse_feed_body(
            "<html><body>not a feed</body></html>",
            "https://example.com",
            window(),
            10,
            TimestampFields::PublishedOrUpdated,
        );
        assert!(matches!(result, Err(AggregatorError::Parse(_))));
    }
}
