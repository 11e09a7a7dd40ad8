//! Storage module for the institution catalog
//!
//! This module handles all database operations for the catalog, including:
//! - SQLite database initialization and schema management
//! - Inserting institutions with their majors and location
//! - Full-table deletion for rebuilds
//! - Executing search queries built by the query module

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::ScoutError;
use std::path::Path;

/// Opens (or creates) the catalog database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, ScoutError> {
    SqliteStorage::new(path)
}

/// An institution row
#[derive(Debug, Clone, PartialEq)]
pub struct Institution {
    /// Canonical name, unique
    pub name: String,
    /// Acceptance rate as a percentage (0-100)
    pub acceptance_rate: f64,
    /// Yearly tuition; 0.0 means unknown
    pub tuition: f64,
    /// Average high-school GPA as printed; empty means unknown
    pub average_gpa: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Institution {
    /// True unless tuition holds the 0.0 "not found" sentinel
    pub fn has_known_tuition(&self) -> bool {
        self.tuition > 0.0
    }

    /// Coordinates, if both are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// A location row; one per institution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub institution_name: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// An institution with the rows created alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionRecord {
    pub institution: Institution,
    pub majors: Vec<String>,
    pub location: Location,
}
