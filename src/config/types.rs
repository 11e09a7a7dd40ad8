use serde::Deserialize;

/// Main configuration structure for College-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub geocoder: Option<GeocoderConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Site root that relative institution links are resolved against
    pub base_url: String,

    /// Path of the first listing page
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    /// Number of listing pages to walk
    #[serde(default = "default_pages")]
    pub pages: u32,

    /// Maximum number of concurrent fetch workers per listing page
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: u32,

    /// Total request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Retries for timeouts and 5xx responses; 0 fails immediately
    #[serde(default)]
    pub max_retries: u32,

    /// Delay between retries (milliseconds)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

/// Geocoding text-search endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GeocoderConfig {
    /// Endpoint URL, e.g. `https://maps.googleapis.com/maps/api/place/textsearch/json`
    pub endpoint: String,

    /// API key appended to every lookup
    pub api_key: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite catalog database
    pub database_path: String,

    /// Path to the SQLite page cache
    pub cache_path: String,
}

fn default_listing_path() -> String {
    "/college-search".to_string()
}

fn default_pages() -> u32 {
    11
}

fn default_max_concurrent_fetches() -> u32 {
    4
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_retry_delay() -> u64 {
    5000
}
