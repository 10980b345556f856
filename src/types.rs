use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of characters stored in [`NormalizedItem::summary`].
pub const SUMMARY_MAX_CHARS: usize = 500;

/// Placeholder substituted when a source omits the item title.
pub const FALLBACK_TITLE: &str = "No title";

/// The common record shape every source adapter emits.
///
/// Items are built once per adapter invocation and never mutated afterwards;
/// they live only for the duration of one collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// Never empty; [`FALLBACK_TITLE`] is substituted when the source omits it.
    pub title: String,
    /// Canonical URL; may be empty when the source provides none.
    pub link: String,
    /// Free-text body, truncated to [`SUMMARY_MAX_CHARS`] characters.
    pub summary: String,
    /// Human-readable origin label (feed title, API name, or
    /// "origin/subcategory" composite).
    pub source: String,
    /// Publish time in UTC; absent when the source provides none.
    pub published: Option<DateTime<Utc>>,
    /// Ranking/vote signal, for sources that expose one.
    pub score: Option<i64>,
    /// Discussion/comment count, for sources that expose one.
    pub engagement_count: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Timeout for listing and feed fetches.
    pub timeout: Duration,
    /// Shorter timeout for high-fan-out per-item fetches.
    pub item_timeout: Duration,
    /// Retries after the initial attempt; a permanently failing endpoint
    /// sees `max_retries + 1` requests.
    pub max_retries: u32,
    /// First backoff delay; subsequent delays double (no jitter).
    pub backoff_base: Duration,
    pub retryable_statuses: Vec<u16>,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "content-aggregator/0.1 (+https://github.com/content-aggregator)"
                .to_string(),
            timeout: Duration::from_secs(10),
            item_timeout: Duration::from_secs(5),
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
            retryable_statuses: vec![429, 500, 502, 503, 504],
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HackerNewsConfig {
    pub api_base: String,
    /// How many ids to take from the top-stories listing.
    pub list_limit: usize,
    /// How many of those ids are fetched individually.
    pub story_limit: usize,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://hacker-news.firebaseio.com/v0".to_string(),
            list_limit: 30,
            story_limit: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub api_base: String,
    pub subreddits: Vec<String>,
    pub per_subreddit_limit: usize,
    /// Posts with fewer comments than this are excluded.
    pub min_comments: i64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.reddit.com".to_string(),
            subreddits: vec![
                "programming".to_string(),
                "ProductManagement".to_string(),
                "ExperiencedDevs".to_string(),
            ],
            per_subreddit_limit: 10,
            min_comments: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SingleFeedConfig {
    pub feed_url: String,
    pub max_entries: usize,
}

impl Default for SingleFeedConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://www.producthunt.com/feed".to_string(),
            max_entries: 15,
        }
    }
}

/// Configuration for one collection run. Each run owns its own fetch client;
/// there is no process-wide session state.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub feeds: Vec<String>,
    pub hacker_news: HackerNewsConfig,
    pub reddit: RedditConfig,
    pub product_hunt: SingleFeedConfig,
    /// Recency window in days for feed sources.
    pub days_back: i64,
    /// Cap on in-flight requests for inner per-item/per-category fan-out.
    pub max_concurrent_requests: usize,
    /// Optional whole-run budget; an adapter still running when it expires is
    /// demoted to a failed outcome while completed adapters' items are kept.
    pub deadline: Option<Duration>,
    pub fetch: FetchConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            feeds: vec![
                "https://news.ycombinator.com/rss".to_string(),
                "https://www.productplan.com/blog/feed/".to_string(),
                "https://www.mindtheproduct.com/feed/".to_string(),
                "https://www.svpg.com/feed/".to_string(),
                "https://www.lennysnewsletter.com/feed".to_string(),
            ],
            hacker_news: HackerNewsConfig::default(),
            reddit: RedditConfig::default(),
            product_hunt: SingleFeedConfig::default(),
            days_back: 7,
            max_concurrent_requests: 5,
            deadline: None,
            fetch: FetchConfig::default(),
        }
    }
}

/// What one source contributed to a collection run: either a count of items
/// or a recorded failure reason. Failures are visible here rather than only
/// in log output.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub source: String,
    pub count: usize,
    pub error: Option<String>,
}

/// Result of a full collection run. An empty run is a distinguishable state,
/// not an error; the caller decides whether to proceed or abort.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub items: Vec<NormalizedItem>,
    pub outcomes: Vec<SourceOutcome>,
}

impl CollectionReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("gave up on {url} after {attempts} attempts: {reason}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
