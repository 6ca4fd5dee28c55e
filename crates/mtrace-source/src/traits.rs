use mtrace_types::{DecodedTrace, ThreadFilter, TimezoneOffset};
use std::path::{Path, PathBuf};

use crate::Result;

/// Decoder boundary: raw trace inputs in, VM metadata plus per-thread
/// ordered points out.
///
/// Implementations block until the whole input is decoded. A returned error
/// is fatal for the import; per-record problems are logged and skipped.
pub trait RecordSource {
    /// Short identifier used in logs (e.g., "jsonl")
    fn id(&self) -> &'static str;

    fn load(&self, inputs: &[PathBuf], options: &SourceOptions) -> Result<DecodedTrace>;
}

/// Knobs handed to every record source.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Threads to keep; empty keeps all
    pub threads: ThreadFilter,
    /// Offset applied to formatted timestamps
    pub timezone: TimezoneOffset,
    /// Trace-format description files (`*.dat`) the decoder needs
    pub format_files: Vec<crate::FormatFile>,
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
