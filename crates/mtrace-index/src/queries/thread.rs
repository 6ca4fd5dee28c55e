use mtrace_types::{ThreadRecord, sanitize};
use rusqlite::{Connection, params};

use crate::Result;

pub fn insert(conn: &Connection, thread: &ThreadRecord) -> Result<()> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO thread (id, native_id, name) VALUES (?1, ?2, ?3)")?;
    stmt.execute(params![thread.id, thread.native_id, sanitize(&thread.name)])?;
    Ok(())
}

pub fn list(conn: &Connection) -> Result<Vec<ThreadRecord>> {
    let mut stmt = conn.prepare("SELECT id, native_id, name FROM thread ORDER BY rowid")?;
    let threads = stmt
        .query_map([], |row| {
            Ok(ThreadRecord {
                id: row.get(0)?,
                native_id: row.get(1)?,
                name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(threads)
}
