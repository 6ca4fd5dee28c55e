use anyhow::Result;
use mtrace_runtime::{Config, ImportProgress, Workspace};
use mtrace_source::JsonlTraceSource;
use mtrace_types::{CancellationToken, ThreadFilter};
use std::path::PathBuf;

pub fn handle(
    workspace: &mut Workspace,
    config: &Config,
    name: &str,
    threads: Option<&str>,
    files: &[PathBuf],
    cancel: &CancellationToken,
) -> Result<()> {
    let mut options = config.source_options()?;
    if let Some(threads) = threads {
        options.threads = ThreadFilter::parse(threads)?;
    }

    let source = JsonlTraceSource::new();
    let report = workspace.import(&source, files, name, &options, cancel, |progress| {
        match progress {
            ImportProgress::Decoding { source, inputs } => {
                eprintln!("Decoding {} file(s) ({})...", inputs, source)
            }
            ImportProgress::Decoded {
                corrupt_blocks, ..
            } if corrupt_blocks > 0 => {
                eprintln!("Skipped {} corrupt block(s)", corrupt_blocks)
            }
            ImportProgress::Replacing { path } => {
                eprintln!("Replacing existing session store {}", path.display())
            }
            _ => {}
        }
    })?;

    println!(
        "Imported session '{}': {} threads, {} points -> {}",
        report.name,
        report.threads,
        report.points,
        report.path.display()
    );
    Ok(())
}
