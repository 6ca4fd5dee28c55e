use mtrace_types::{CancellationToken, DecodedTrace, PointRow, ThreadRecord};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::queries::{info, point, raw, thread};
use crate::records::{InfoEntry, QueryTable, WriteSummary};
use crate::schema;
use crate::{Error, Result};

/// Handle to one session's database file.
///
/// A store is written exactly once, by [`SessionStore::write_trace`]; every
/// other operation only reads.
pub struct SessionStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Create a new, empty database file. The schema is created by `write_trace`.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an existing session file, refusing files without the marker table.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        if !schema::has_marker_table(&conn)? {
            return Err(Error::NotASessionStore(path.to_path_buf()));
        }

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_populated(&self) -> Result<bool> {
        schema::has_marker_table(&self.conn)
    }

    /// Persist a decoded trace inside one transaction.
    ///
    /// Schema, info rows, threads and points commit together or not at all.
    /// Points are written thread by thread in decode order, which is the
    /// order every later scan observes.
    pub fn write_trace(
        &mut self,
        name: &str,
        trace: &DecodedTrace,
        cancel: &CancellationToken,
    ) -> Result<WriteSummary> {
        if self.is_populated()? {
            return Err(Error::Query("session store is already populated".to_string()));
        }

        let tx = self.conn.transaction()?;
        tx.execute_batch(schema::CREATE_TABLES)?;

        info::insert(&tx, schema::INFO_KEY_NAME, name)?;
        info::insert(&tx, schema::INFO_KEY_SUMMARY, &trace.vm.summary)?;
        info::insert(&tx, schema::INFO_KEY_VM, &trace.vm.version)?;

        let mut summary = WriteSummary::default();
        for decoded in &trace.threads {
            cancel.check()?;
            thread::insert(&tx, &decoded.thread)?;
            summary.threads += 1;

            for tp in &decoded.points {
                cancel.check()?;
                point::insert(&tx, tp, decoded.thread.id)?;
                summary.points += 1;
            }
        }

        // Dropping `tx` on any early return above rolls everything back
        tx.commit()?;
        debug!(
            threads = summary.threads,
            points = summary.points,
            "session store committed"
        );
        Ok(summary)
    }

    pub fn info_entries(&self) -> Result<Vec<InfoEntry>> {
        info::list(&self.conn)
    }

    pub fn info_value(&self, key: &str) -> Result<Option<String>> {
        info::get(&self.conn, key)
    }

    pub fn threads(&self) -> Result<Vec<ThreadRecord>> {
        thread::list(&self.conn)
    }

    pub fn point_count(&self) -> Result<u64> {
        point::count(&self.conn)
    }

    /// Fold over points of the given components in stored order.
    ///
    /// The accumulator is moved into and returned from every step.
    pub fn fold_points<B, F>(
        &self,
        components: &[&str],
        cancel: &CancellationToken,
        init: B,
        step: F,
    ) -> Result<B>
    where
        F: FnMut(B, PointRow) -> B,
    {
        point::fold(&self.conn, components, cancel, init, step)
    }

    /// `(parameters, count)` of method entry points, grouped by stored parameters.
    pub fn method_entry_counts(&self) -> Result<Vec<(String, u64)>> {
        point::entry_counts(&self.conn)
    }

    /// Run a read-only statement and render every value as text.
    pub fn raw_query(&self, sql: &str) -> Result<QueryTable> {
        raw::run(&self.conn, sql)
    }

    /// Release the connection, surfacing any close error.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| Error::Database(err))
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("path", &self.path).finish()
    }
}
