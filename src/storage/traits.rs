//! Storage traits and error types
//!
//! This module defines the trait interface for catalog backends and
//! associated error types.

use crate::query::{SearchQuery, SearchResult};
use crate::storage::{Institution, InstitutionRecord, Location};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog backend implementations
///
/// The catalog is written by a single builder; searches may read it freely
/// once built.
pub trait Storage {
    // ===== Writes =====

    /// Inserts an institution together with its majors and location
    ///
    /// Returns false, inserting nothing, if an institution with the same
    /// name already exists.
    fn insert_institution(&mut self, record: &InstitutionRecord) -> StorageResult<bool>;

    /// Deletes every institution, major, and location
    fn clear_all(&mut self) -> StorageResult<()>;

    // ===== Lookups =====

    /// Gets an institution by name
    fn get_institution(&self, name: &str) -> StorageResult<Option<Institution>>;

    /// Gets the location of an institution
    fn get_location(&self, name: &str) -> StorageResult<Option<Location>>;

    /// Gets the majors of an institution in insertion order
    fn get_majors(&self, name: &str) -> StorageResult<Vec<String>>;

    // ===== Search =====

    /// Runs a built search query, returning every matching row
    fn run_search(&self, query: &SearchQuery) -> StorageResult<Vec<SearchResult>>;

    // ===== Statistics =====

    fn count_institutions(&self) -> StorageResult<u64>;

    fn count_majors(&self) -> StorageResult<u64>;

    fn count_locations(&self) -> StorageResult<u64>;

    /// Counts institutions with both coordinates present
    fn count_geocoded(&self) -> StorageResult<u64>;

    /// Counts institutions stored with the 0.0 tuition sentinel
    fn count_unknown_tuition(&self) -> StorageResult<u64>;
}
