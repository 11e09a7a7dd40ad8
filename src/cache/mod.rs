//! Write-once page cache
//!
//! This module persists everything fetched from the network so that crawls
//! and catalog rebuilds can be replayed without touching the site again:
//! - Raw listing and institution pages keyed by canonical URL
//! - Raw geocoder responses keyed by the full lookup URL
//! - The frontier of discovered institution URLs
//!
//! Every entry is written once; the first stored body for a key is permanent.

mod page_cache;
mod schema;

pub use page_cache::PageCache;

use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cache lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// The key-value tables held by the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTable {
    /// Raw HTML keyed by canonical URL
    Pages,
    /// Raw geocoder responses keyed by lookup URL
    Geocodes,
}

impl CacheTable {
    pub(crate) fn table_name(&self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Geocodes => "geocodes",
        }
    }
}
