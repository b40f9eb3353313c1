//! `SQLite` schema for the state store.

/// Named JSON blobs, one row per key.
pub const CREATE_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
";

/// Internal bookkeeping such as the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_ENTRIES_TABLE, CREATE_METADATA_TABLE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_table_columns() {
        assert!(CREATE_ENTRIES_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_ENTRIES_TABLE.contains("value TEXT NOT NULL"));
        assert!(CREATE_ENTRIES_TABLE.contains("updated_at"));
    }

    #[test]
    fn test_statements_execute_on_fresh_db() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        for stmt in SCHEMA_STATEMENTS {
            conn.execute(stmt, []).unwrap();
        }
        conn.execute(
            "INSERT INTO entries (key, value) VALUES ('k', 'v')",
            [],
        )
        .unwrap();
        let updated: String = conn
            .query_row("SELECT updated_at FROM entries WHERE key = 'k'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(updated.ends_with('Z'));
    }
}
