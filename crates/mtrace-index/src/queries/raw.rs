use rusqlite::Connection;
use rusqlite::types::ValueRef;

use crate::records::QueryTable;
use crate::{Error, Result};

pub fn run(conn: &Connection, sql: &str) -> Result<QueryTable> {
    let mut stmt = conn.prepare(sql)?;
    if !stmt.readonly() {
        return Err(Error::Query(
            "only read-only statements can run against a session store".to_string(),
        ));
    }

    let mut columns = vec!["Sl. No.".to_string()];
    columns.extend(stmt.column_names().into_iter().map(str::to_string));
    let width = stmt.column_count();

    let mut table = QueryTable {
        columns,
        rows: Vec::new(),
    };
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width + 1);
        values.push((table.rows.len() + 1).to_string());
        for i in 0..width {
            values.push(render_value(row.get_ref(i)?));
        }
        table.rows.push(values);
    }
    Ok(table)
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
