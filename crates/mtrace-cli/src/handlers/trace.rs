use anyhow::Result;
use mtrace_runtime::Workspace;
use mtrace_types::CancellationToken;

pub fn handle(
    workspace: &Workspace,
    name: &str,
    indent: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    match workspace.render_trace(name, indent, cancel)? {
        Some(trace) => {
            print!("{}", trace);
            Ok(())
        }
        None => super::not_found(name),
    }
}
