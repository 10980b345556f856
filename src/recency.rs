use chrono::{DateTime, Duration, Utc};

/// Start of the recency window: `now - days_back`.
pub fn window_start(days_back: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days_back)
}

/// Whether an item falls inside the recency window. Items with an unknown
/// publish time are kept; the filter cannot assert absence of recency.
pub fn is_recent(published: Option<DateTime<Utc>>, window_start: DateTime<Utc>) -> bool {
    match published {
        Some(ts) => ts >= window_start,
        None => true,
    }
}
