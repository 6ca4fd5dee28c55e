use crate::output::render_table;
use anyhow::Result;
use mtrace_runtime::{DiscoveryReport, Workspace};

pub fn handle(workspace: &Workspace, report: &DiscoveryReport) -> Result<()> {
    for skipped in &report.skipped {
        eprintln!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    let summaries = workspace.summaries()?;
    if summaries.is_empty() {
        println!("No sessions in {}", workspace.root().display());
        return Ok(());
    }

    let columns = ["Name", "Threads", "Points", "VM"].map(String::from);
    let rows: Vec<Vec<String>> = summaries
        .into_iter()
        .map(|s| {
            vec![
                s.name,
                s.threads.to_string(),
                s.points.to_string(),
                s.vm,
            ]
        })
        .collect();
    print!("{}", render_table(&columns, &rows));
    Ok(())
}
