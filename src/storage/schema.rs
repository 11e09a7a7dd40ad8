//! Database schema definitions
//!
//! This module contains the SQL schema for the College-Scout catalog.

/// SQL schema for the catalog database
pub const SCHEMA_SQL: &str = r#"
-- One row per institution, keyed by canonical name
CREATE TABLE IF NOT EXISTS institutions (
    name TEXT PRIMARY KEY,
    acceptance_rate REAL NOT NULL,
    tuition REAL NOT NULL DEFAULT 0.0,
    average_gpa TEXT NOT NULL DEFAULT '',
    latitude REAL,
    longitude REAL
);

-- Majors offered; duplicates are kept as scraped
CREATE TABLE IF NOT EXISTS majors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    institution_name TEXT NOT NULL REFERENCES institutions(name),
    major_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_majors_institution ON majors(institution_name);

-- Exactly one location per institution
CREATE TABLE IF NOT EXISTS locations (
    institution_name TEXT PRIMARY KEY REFERENCES institutions(name),
    street_address TEXT,
    city TEXT,
    state TEXT,
    zip_code TEXT
);

CREATE INDEX IF NOT EXISTS idx_locations_state ON locations(state);
"#;

/// Initializes the database schema
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
