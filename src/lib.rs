pub mod aggregator;
pub mod fetcher;
pub mod recency;
pub mod sources;
pub mod types;

pub use aggregator::ContentAggregator;
pub use fetcher::Fetcher;
pub use sources::{ContentSource, FeedSource, HackerNewsSource, ProductHuntSource, RedditSource};
pub use types::*;
