//! Statistics gathered from the catalog and the page cache
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics alongside the size of the crawl caches.

use crate::cache::{CacheTable, PageCache};
use crate::storage::Storage;
use crate::ScoutError;

/// Catalog and cache statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStatistics {
    pub institutions: u64,
    pub majors: u64,
    pub locations: u64,

    /// Institutions with both coordinates
    pub geocoded: u64,

    /// Institutions stored with unknown tuition
    pub unknown_tuition: u64,

    pub cached_pages: u64,
    pub cached_geocodes: u64,

    /// Institution URLs in the link frontier
    pub frontier: u64,
}

impl CatalogStatistics {
    /// Share of institutions with coordinates, as a percentage
    pub fn geocoded_rate(&self) -> f64 {
        if self.institutions > 0 {
            (self.geocoded as f64 / self.institutions as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Loads statistics from storage and cache
///
/// # Arguments
///
/// * `storage` - The catalog to count
/// * `cache` - The page cache holding pages, geocodes, and the frontier
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(ScoutError)` - Failed to query statistics
pub fn load_statistics(
    storage: &dyn Storage,
    cache: &PageCache,
) -> Result<CatalogStatistics, ScoutError> {
    Ok(CatalogStatistics {
        institutions: storage.count_institutions()?,
        majors: storage.count_majors()?,
        locations: storage.count_locations()?,
        geocoded: storage.count_geocoded()?,
        unknown_tuition: storage.count_unknown_tuition()?,
        cached_pages: cache.len(CacheTable::Pages)?,
        cached_geocodes: cache.len(CacheTable::Geocodes)?,
        frontier: cache.frontier_len()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Catalog:");
    println!("  Institutions: {}", stats.institutions);
    println!("  Majors: {}", stats.majors);
    println!("  Locations: {}", stats.locations);
    println!(
        "  Geocoded: {} ({:.1}%)",
        stats.geocoded,
        stats.geocoded_rate()
    );
    println!("  Unknown tuition: {}", stats.unknown_tuition);
    println!();

    println!("Cache:");
    println!("  Pages: {}", stats.cached_pages);
    println!("  Geocode responses: {}", stats.cached_geocodes);
    println!("  Frontier: {}", stats.frontier);
}
