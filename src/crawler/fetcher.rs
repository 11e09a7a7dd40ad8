//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - Cache-first GET requests against the write-once page cache
//! - Per-key exclusion so racing workers fetch a URL at most once
//! - Optional retries for timeouts and 5xx responses
//! - Error classification

use crate::cache::{CacheError, CacheTable, PageCache};
use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::ScoutError;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use college_scout::config::{CrawlerConfig, UserAgentConfig};
/// use college_scout::crawler::build_http_client;
/// # fn example(crawler: &CrawlerConfig) {
/// let user_agent = UserAgentConfig {
///     crawler_name: "CollegeScout".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(crawler, &user_agent).unwrap();
/// # }
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        user_agent.crawler_name, user_agent.crawler_version, user_agent.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Cache-first fetcher shared by all crawl workers
///
/// A cached key never causes a network call. On a miss, exactly one
/// retrieval is performed per key even when several workers ask for it at
/// once; the body is stored before it is returned.
pub struct Fetcher {
    client: Client,
    cache: Arc<PageCache>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    max_retries: u32,
    retry_delay: Duration,
    network_requests: AtomicU64,
}

impl Fetcher {
    pub fn new(client: Client, cache: Arc<PageCache>) -> Self {
        Self {
            client,
            cache,
            in_flight: Mutex::new(HashMap::new()),
            max_retries: 0,
            retry_delay: Duration::from_millis(0),
            network_requests: AtomicU64::new(0),
        }
    }

    /// Enables retrying timeouts and 5xx responses
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Builds a fetcher from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
        cache: Arc<PageCache>,
    ) -> Result<Self, ScoutError> {
        let client = build_http_client(crawler, user_agent)?;
        Ok(Self::new(client, cache).with_retries(
            crawler.max_retries,
            Duration::from_millis(crawler.retry_delay_ms),
        ))
    }

    /// The cache this fetcher writes through
    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    #[cfg(test)]
    fn in_flight_keys(&self) -> usize {
        self.in_flight
            .lock()
            .map(|in_flight| in_flight.len())
            .unwrap_or_default()
    }

    /// Number of requests that actually went out over the network
    pub fn network_requests(&self) -> u64 {
        self.network_requests.load(Ordering::Relaxed)
    }

    /// Fetches a page body, consulting the page cache first
    pub async fn fetch(&self, url: &str) -> Result<String, ScoutError> {
        self.fetch_cached(CacheTable::Pages, url).await
    }

    /// Fetches `url` through the given cache table
    ///
    /// The URL itself is the cache key.
    pub async fn fetch_cached(&self, table: CacheTable, url: &str) -> Result<String, ScoutError> {
        self.fetch_validated(table, url, |_| Ok(())).await
    }

    /// Like [`Fetcher::fetch_cached`], but a fresh body is only cached once
    /// `validate` accepts it
    ///
    /// A rejected body is returned as the validator's error and never
    /// written, so the next call goes back to the network.
    pub async fn fetch_validated<F>(
        &self,
        table: CacheTable,
        url: &str,
        validate: F,
    ) -> Result<String, ScoutError>
    where
        F: Fn(&str) -> Result<(), ScoutError>,
    {
        if let Some(body) = self.cache.get(table, url)? {
            tracing::trace!("Cache hit: {}", url);
            return Ok(body);
        }

        let key_lock = self.key_lock(url)?;
        let _release = KeyRelease { fetcher: self, url };
        let _guard = key_lock.lock().await;
        self.fetch_locked(table, url, validate).await
    }

    async fn fetch_locked<F>(
        &self,
        table: CacheTable,
        url: &str,
        validate: F,
    ) -> Result<String, ScoutError>
    where
        F: Fn(&str) -> Result<(), ScoutError>,
    {
        // another worker may have filled the entry while we waited
        if let Some(body) = self.cache.get(table, url)? {
            tracing::trace!("Cache filled while waiting: {}", url);
            return Ok(body);
        }

        let body = self.fetch_with_retry(url).await?;
        validate(&body)?;
        let stored = self.cache.put_if_absent(table, url, &body)?;
        tracing::debug!("Fetched and cached {} ({} bytes)", url, stored.len());
        Ok(stored)
    }

    fn key_lock(&self, url: &str) -> Result<Arc<tokio::sync::Mutex<()>>, ScoutError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))?;
        Ok(Arc::clone(in_flight.entry(url.to_string()).or_default()))
    }

    /// Fetches over the network, retrying timeouts and 5xx responses
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 5xx | Retry up to `max_retries` times |
    /// | Timeout | Retry up to `max_retries` times |
    /// | Other HTTP error | Immediate failure |
    /// | Connection error | Immediate failure |
    async fn fetch_with_retry(&self, url: &str) -> Result<String, ScoutError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ScoutError> {
        self.network_requests.fetch_add(1, Ordering::Relaxed);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

/// Drops a URL's in-flight entry when the fetch finishes or is cancelled
struct KeyRelease<'a> {
    fetcher: &'a Fetcher,
    url: &'a str,
}

impl Drop for KeyRelease<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .fetcher
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.remove(self.url);
    }
}

/// Maps a transport error onto the crate's network error variants
fn classify_error(url: &str, error: reqwest::Error) -> ScoutError {
    if error.is_timeout() {
        ScoutError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        ScoutError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        ScoutError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

fn is_retryable(error: &ScoutError) -> bool {
    match error {
        ScoutError::Timeout { .. } => true,
        ScoutError::Http { status, .. } => *status >= 500,
        _ => false,
    }
}
