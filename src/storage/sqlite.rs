//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::query::{SearchQuery, SearchResult};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{Institution, InstitutionRecord, Location};
use crate::ScoutError;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;

const INSTITUTION_COLUMNS: &str =
    "name, acceptance_rate, tuition, average_gpa, latitude, longitude";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(ScoutError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ScoutError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, ScoutError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Maps the leading institution columns of a row
fn institution_from_row(row: &Row<'_>) -> rusqlite::Result<Institution> {
    Ok(Institution {
        name: row.get(0)?,
        acceptance_rate: row.get(1)?,
        tuition: row.get(2)?,
        average_gpa: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Writes =====

    fn insert_institution(&mut self, record: &InstitutionRecord) -> StorageResult<bool> {
        let institution = &record.institution;
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO institutions (name, acceptance_rate, tuition, average_gpa, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                institution.name,
                institution.acceptance_rate,
                institution.tuition,
                institution.average_gpa,
                institution.latitude,
                institution.longitude
            ],
        )?;

        if inserted == 0 {
            tracing::warn!("Institution {} already stored, skipping", institution.name);
            return Ok(false);
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO majors (institution_name, major_name) VALUES (?1, ?2)",
            )?;
            for major in &record.majors {
                stmt.execute(params![institution.name, major])?;
            }
        }

        let location = &record.location;
        tx.execute(
            "INSERT INTO locations (institution_name, street_address, city, state, zip_code)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                institution.name,
                location.street_address,
                location.city,
                location.state,
                location.zip_code
            ],
        )?;

        tx.commit()?;
        Ok(true)
    }

    fn clear_all(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM majors", [])?;
        tx.execute("DELETE FROM locations", [])?;
        tx.execute("DELETE FROM institutions", [])?;
        tx.commit()?;
        Ok(())
    }

    // ===== Lookups =====

    fn get_institution(&self, name: &str) -> StorageResult<Option<Institution>> {
        let institution = self
            .conn
            .query_row(
                &format!("SELECT {} FROM institutions WHERE name = ?1", INSTITUTION_COLUMNS),
                params![name],
                institution_from_row,
            )
            .optional()?;
        Ok(institution)
    }

    fn get_location(&self, name: &str) -> StorageResult<Option<Location>> {
        let location = self
            .conn
            .query_row(
                "SELECT institution_name, street_address, city, state, zip_code
                 FROM locations WHERE institution_name = ?1",
                params![name],
                |row| {
                    Ok(Location {
                        institution_name: row.get(0)?,
                        street_address: row.get(1)?,
                        city: row.get(2)?,
                        state: row.get(3)?,
                        zip_code: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(location)
    }

    fn get_majors(&self, name: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT major_name FROM majors WHERE institution_name = ?1 ORDER BY id")?;

        let majors = stmt
            .query_map(params![name], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(majors)
    }

    // ===== Search =====

    fn run_search(&self, query: &SearchQuery) -> StorageResult<Vec<SearchResult>> {
        let mut stmt = self.conn.prepare(&query.sql)?;

        let results = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                let institution = institution_from_row(row)?;
                if query.counted {
                    let matches: i64 = row.get(6)?;
                    Ok(SearchResult::Counted(institution, matches as u64))
                } else {
                    Ok(SearchResult::Plain(institution))
                }
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    // ===== Statistics =====

    fn count_institutions(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM institutions")
    }

    fn count_majors(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM majors")
    }

    fn count_locations(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM locations")
    }

    fn count_geocoded(&self) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM institutions WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
        )
    }

    fn count_unknown_tuition(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM institutions WHERE tuition <= 0")
    }
}
