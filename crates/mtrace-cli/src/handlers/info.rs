use anyhow::Result;
use mtrace_runtime::Workspace;

pub fn handle(workspace: &Workspace, name: &str) -> Result<()> {
    match workspace.session_info(name)? {
        Some(info) => {
            print!("{}", info);
            Ok(())
        }
        None => super::not_found(name),
    }
}
