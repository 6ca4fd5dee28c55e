pub mod calls;
pub mod import;
pub mod info;
pub mod sessions;
pub mod sql;
pub mod stats;
pub mod trace;

use anyhow::{Result, anyhow};

/// Uniform error for a session name the workspace does not know.
pub(crate) fn not_found<T>(name: &str) -> Result<T> {
    Err(anyhow!(
        "Session '{}' not found. Run `mtrace sessions` to list available sessions",
        name
    ))
}
