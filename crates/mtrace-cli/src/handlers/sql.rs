use crate::output::render_table;
use anyhow::Result;
use mtrace_runtime::Workspace;

pub fn handle(workspace: &Workspace, name: &str, query: &str) -> Result<()> {
    let Some(table) = workspace.raw_query(name, query)? else {
        return super::not_found(name);
    };
    print!("{}", render_table(&table.columns, &table.rows));
    Ok(())
}
