use mtrace_types::{
    COMPONENT_METHOD_TRACE, CancellationToken, PointRow, PointType, TracePoint, join_parameters,
    sanitize,
};
use rusqlite::{Connection, params, params_from_iter};

use crate::Result;

pub fn insert(conn: &Connection, point: &TracePoint, thread_id: i64) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO point (tp_id, component, container_component, debug_info,
                           formatted_parameters, parameters, formatted_time, t_time,
                           "groups", type, thread_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )?;
    stmt.execute(params![
        point.tp_id,
        sanitize(&point.component),
        sanitize(&point.container_component),
        sanitize(&point.debug_info),
        sanitize(&point.formatted_parameters),
        join_parameters(&point.parameters),
        sanitize(&point.formatted_time),
        point.raw_time.to_string(),
        sanitize(&point.groups.join(",")),
        point.kind.as_str(),
        thread_id,
    ])?;
    Ok(())
}

pub fn count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM point", [], |row| row.get(0))?;
    Ok(count as u64)
}

pub fn fold<B, F>(
    conn: &Connection,
    components: &[&str],
    cancel: &CancellationToken,
    init: B,
    mut step: F,
) -> Result<B>
where
    F: FnMut(B, PointRow) -> B,
{
    if components.is_empty() {
        return Ok(init);
    }

    // LIKE without wildcards is a case-insensitive equality in SQLite
    let filter = (1..=components.len())
        .map(|i| format!("component LIKE ?{}", i))
        .collect::<Vec<_>>()
        .join(" OR ");
    let query = format!(
        r#"
        SELECT tp_id, component, formatted_parameters, parameters,
               CAST(t_time AS INTEGER), type, thread_id
        FROM point
        WHERE {}
        ORDER BY rowid
        "#,
        filter
    );

    let mut stmt = conn.prepare(&query)?;
    let mut rows = stmt.query(params_from_iter(components.iter()))?;

    let mut acc = init;
    while let Some(row) = rows.next()? {
        cancel.check()?;
        let kind: Option<String> = row.get(5)?;
        let point = PointRow {
            tp_id: row.get::<_, Option<i64>>(0)?.unwrap_or_default(),
            component: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            formatted_parameters: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            parameters: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            raw_time: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
            kind: kind
                .as_deref()
                .unwrap_or_default()
                .parse()
                .unwrap_or(PointType::Event),
            thread_id: row.get::<_, Option<i64>>(6)?.unwrap_or_default(),
        };
        acc = step(acc, point);
    }
    Ok(acc)
}

pub fn entry_counts(conn: &Connection) -> Result<Vec<(String, u64)>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT parameters, COUNT(parameters)
        FROM point
        WHERE component = ?1 AND type = ?2
        GROUP BY parameters
        "#,
    )?;
    let counts = stmt
        .query_map(params![COMPONENT_METHOD_TRACE, PointType::Entry.as_str()], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                row.get::<_, i64>(1)? as u64,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(counts)
}
