use super::args::{Cli, Commands};
use super::handlers;
use super::logging;
use anyhow::Result;
use mtrace_runtime::{Config, Workspace, resolve_workspace_path};
use mtrace_types::CancellationToken;
use tracing::warn;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let root = resolve_workspace_path(cli.workspace.as_deref())?;
    let config = Config::load_from(&Config::path_in(&root))?;
    let cancel = interrupt_token();

    let (mut workspace, report) = Workspace::open_and_discover(&root)?;

    match cli.command {
        Commands::Import {
            name,
            threads,
            files,
        } => handlers::import::handle(
            &mut workspace,
            &config,
            &name,
            threads.as_deref(),
            &files,
            &cancel,
        ),
        Commands::Sessions => handlers::sessions::handle(&workspace, &report),
        Commands::Trace { name, indent } => {
            handlers::trace::handle(&workspace, &name, indent, &cancel)
        }
        Commands::Calls {
            name,
            format,
            scope,
        } => {
            let scope = scope.map(Into::into).unwrap_or(config.stack_scope);
            handlers::calls::handle(&workspace, &name, scope, format, &cancel)
        }
        Commands::Stats { names, format } => handlers::stats::handle(&workspace, &names, format),
        Commands::Info { name } => handlers::info::handle(&workspace, &name),
        Commands::Sql { name, query } => handlers::sql::handle(&workspace, &name, &query),
    }
}

/// Token tripped by Ctrl-C; long scans and writes stop at the next row.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }
    cancel
}
