//! Cache schema definitions

/// SQL schema for the cache database
pub const SCHEMA_SQL: &str = r#"
-- Raw page bodies keyed by canonical URL
CREATE TABLE IF NOT EXISTS pages (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);

-- Raw geocoder responses keyed by lookup URL
CREATE TABLE IF NOT EXISTS geocodes (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);

-- Discovered institution base URLs, in discovery order
CREATE TABLE IF NOT EXISTS frontier (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    discovered_at TEXT NOT NULL
);
"#;

/// Initializes the cache schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
