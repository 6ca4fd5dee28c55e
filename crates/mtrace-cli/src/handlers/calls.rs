use crate::args::CallsFormat;
use crate::output::render_table;
use anyhow::Result;
use mtrace_engine::StackScope;
use mtrace_runtime::Workspace;
use mtrace_types::{CancellationToken, MethodInvocation};

pub fn handle(
    workspace: &Workspace,
    name: &str,
    scope: StackScope,
    format: CallsFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let Some(invocations) = workspace.reconstruct(name, scope, cancel)? else {
        return super::not_found(name);
    };

    match format {
        CallsFormat::Json => println!("{}", serde_json::to_string_pretty(&invocations)?),
        CallsFormat::Plain => {
            let columns = ["#", "Thread", "Level", "Method", "Time In", "Duration", "Status"]
                .map(String::from);
            let rows: Vec<Vec<String>> = invocations
                .iter()
                .enumerate()
                .map(|(i, inv)| plain_row(i + 1, inv))
                .collect();
            print!("{}", render_table(&columns, &rows));
        }
    }
    Ok(())
}

fn plain_row(index: usize, invocation: &MethodInvocation) -> Vec<String> {
    let status = if !invocation.is_completed {
        "open"
    } else if invocation.has_exception {
        "exception"
    } else {
        "ok"
    };

    vec![
        index.to_string(),
        format!("{:#x}", invocation.thread_id),
        invocation.stack_level.to_string(),
        format!(
            "{}{}{}",
            "  ".repeat(invocation.stack_level),
            invocation.qualified_name(),
            invocation.parameters
        ),
        invocation.time_in.to_string(),
        invocation
            .duration()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        status.to_string(),
    ]
}
