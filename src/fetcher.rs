use crate::types::{AggregatorError, FetchConfig, Result};
use backoff::backoff::Backoff;
use backoff::exponential::ExponentialBackoff;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP fetch client with bounded retries and exponential backoff.
///
/// One `Fetcher` is constructed per collection run and shared by every
/// adapter; it carries the identifying `User-Agent` so source servers can
/// rate-limit the client instead of rejecting it as an anonymous script.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    fn new_backoff(&self) -> ExponentialBackoff<backoff::SystemClock> {
        ExponentialBackoff {
            current_interval: self.config.backoff_base,
            initial_interval: self.config.backoff_base,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: self.config.backoff_base * 32,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.get_with_timeout(url, self.config.timeout).await
    }

    /// GET with a per-request timeout override, retrying network errors and
    /// retryable statuses. Non-retryable HTTP errors fail immediately; an
    /// exhausted retry budget yields [`AggregatorError::RetriesExhausted`].
    /// Callers treat either error as "no response", never as a fatal
    /// condition.
    pub async fn get_with_timeout(&self, url: &str, timeout: Duration) -> Result<Response> {
        let mut backoff = self.new_backoff();
        let attempts = self.config.max_retries + 1;
        let mut last_reason = String::new();

        for attempt in 0..attempts {
            match self.client.get(url).timeout(timeout).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!("fetched {} ({})", url, status);
                        return Ok(response);
                    }
                    if !self.config.retryable_statuses.contains(&status.as_u16()) {
                        return Err(AggregatorError::Status {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }
                    last_reason = format!("HTTP {}", status.as_u16());
                }
                Err(e) => {
                    last_reason = e.to_string();
                }
            }

            // Sleep only between attempts, never after the final one.
            if attempt + 1 < attempts {
                if let Some(delay) = backoff.next_backoff() {
                    warn!(
                        "attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        attempts,
                        url,
                        last_reason,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        warn!("giving up on {} after {} attempts: {}", url, attempts, last_reason);
        Err(AggregatorError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            reason: last_reason,
        })
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, timeout: Duration) -> Result<T> {
        Ok(self.get_with_timeout(url, timeout).await?.json::<T>().await?)
    }

    /// Default timeout for listing and feed fetches.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Shorter timeout for high-fan-out per-item fetches.
    pub fn item_timeout(&self) -> Duration {
        self.config.item_timeout
    }
}
