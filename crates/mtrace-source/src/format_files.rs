//! Trace-format description files shipped with the JRE.

use std::path::{Path, PathBuf};

/// A `*.dat` file the decoder reads message formats from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatFile {
    pub path: PathBuf,
    /// Missing required files abort the import; optional ones are skipped
    pub required: bool,
}

impl FormatFile {
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
        }
    }

    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
        }
    }
}

/// Standard format files under `<jre>/lib`.
pub fn default_for_jre(jre_home: &Path) -> Vec<FormatFile> {
    let lib = jre_home.join("lib");
    vec![
        FormatFile::required(lib.join("J9TraceFormat.dat")),
        FormatFile::required(lib.join("OMRTraceFormat.dat")),
        FormatFile::optional(lib.join("TraceFormat.dat")),
    ]
}
