//! College-Scout: a university facts harvester
//!
//! This crate scrapes a paginated college directory into a write-once page
//! cache, extracts typed facts about each institution into a SQLite catalog,
//! and answers filtered searches over that catalog.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod geo;
pub mod output;
pub mod query;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for College-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Geocoder refused {url}: {status}")]
    Geocoder { url: String, status: String },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker pool closed: {0}")]
    WorkerPool(#[from] tokio::sync::AcquireError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ScoutError {
    /// Returns true for transport-level failures (connection, timeout)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for College-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::PageCache;
pub use config::Config;
pub use query::{SearchFilter, SearchResult};
pub use storage::{Institution, Location};
