use crate::args::TableFormat;
use crate::output::render_table;
use anyhow::{Result, bail};
use mtrace_runtime::Workspace;

pub fn handle(workspace: &Workspace, names: &[String], format: TableFormat) -> Result<()> {
    let table = workspace.invocation_stats(names)?;
    if table.sessions.is_empty() {
        bail!("None of the given sessions exist: {}", names.join(", "));
    }

    let columns = table.columns();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.method.clone())
                .chain(row.counts.iter().map(|c| c.to_string()))
                .collect()
        })
        .collect();

    match format {
        TableFormat::Plain => print!("{}", render_table(&columns, &rows)),
        TableFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(&columns)?;
            for row in &rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        TableFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
    }
    Ok(())
}
