use rusqlite::{Connection, OptionalExtension};

use crate::Result;

pub const INFO_KEY_NAME: &str = "name";
pub const INFO_KEY_SUMMARY: &str = "summary";
pub const INFO_KEY_VM: &str = "vm";

// Column layout matches session files written by earlier releases; `t_time`
// stays TEXT for that reason and is cast on read.
pub(crate) const CREATE_TABLES: &str = r#"
    CREATE TABLE info (
        key VARCHAR(16),
        value TEXT
    );

    CREATE TABLE thread (
        id INTEGER,
        native_id INTEGER,
        name TEXT
    );

    CREATE TABLE point (
        tp_id INTEGER,
        component TEXT,
        container_component TEXT,
        debug_info TEXT,
        formatted_parameters TEXT,
        parameters TEXT,
        formatted_time TEXT,
        t_time TEXT,
        "groups" TEXT,
        type TEXT,
        thread_id INTEGER
    );
"#;

/// The `info` table marks a file as a session store.
pub(crate) fn has_marker_table(conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'info'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(found.is_some())
}
