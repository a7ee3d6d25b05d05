//! SQLite schema for the document store.

use super::StoreError;
use rusqlite::{params, Connection, OptionalExtension};

pub const SCHEMA_VERSION: i64 = 1;

pub fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            source TEXT NOT NULL,
            text TEXT NOT NULL,
            metadata_json TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_documents_source ON documents(source);
        ",
    )?;

    match read_meta(conn, "schema_version")? {
        None => write_meta(conn, "schema_version", &SCHEMA_VERSION.to_string())?,
        Some(raw) => {
            let version = raw.parse::<i64>().unwrap_or(-1);
            if version != SCHEMA_VERSION {
                return Err(StoreError::UnsupportedSchema { found: version, expected: SCHEMA_VERSION });
            }
        }
    }
    Ok(())
}

pub fn read_meta(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
    let value = conn
        .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

pub fn write_meta(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO metadata(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_records_version_once() {
        let conn = Connection::open_in_memory().expect("open db");
        ensure_schema(&conn).expect("first");
        ensure_schema(&conn).expect("second");
        assert_eq!(read_meta(&conn, "schema_version").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn ensure_schema_rejects_unknown_version() {
        let conn = Connection::open_in_memory().expect("open db");
        ensure_schema(&conn).expect("create");
        write_meta(&conn, "schema_version", "999").unwrap();

        let err = ensure_schema(&conn).expect_err("must fail on mismatched schema version");
        assert!(err.to_string().contains("Unsupported store schema version 999"));
    }
}
