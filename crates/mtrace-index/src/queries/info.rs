use mtrace_types::sanitize;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Result;
use crate::records::InfoEntry;

pub fn insert(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO info (key, value) VALUES (?1, ?2)",
        params![key, sanitize(value)],
    )?;
    Ok(())
}

pub fn list(conn: &Connection) -> Result<Vec<InfoEntry>> {
    let mut stmt = conn.prepare("SELECT key, value FROM info ORDER BY rowid")?;
    let entries = stmt
        .query_map([], |row| {
            Ok(InfoEntry {
                key: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                value: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(entries)
}

pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM info WHERE key = ?1 ORDER BY rowid LIMIT 1",
            [key],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(value.flatten())
}
