use std::fmt;
use std::path::PathBuf;

/// Result type for mtrace-source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding trace inputs
///
/// Every variant is fatal for the import that triggered it; recoverable
/// conditions (corrupt blocks, missing optional format files) are logged by
/// the reader and never surface here.
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// JSON parsing failed
    Json(serde_json::Error),

    /// Trace header could not be read from the given file
    Header { path: PathBuf, message: String },

    /// A required trace-format description file is missing or unreadable
    FormatData { path: PathBuf, message: String },

    /// Input is structurally invalid (bad line, no inputs, ...)
    Parse(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Header { path, message } => write!(
                f,
                "Unable to read trace header from file {}: {}. Please check that the input file is a binary trace file",
                path.display(),
                message
            ),
            Error::FormatData { path, message } => write!(
                f,
                "Unable to process trace format data file {}: {}",
                path.display(),
                message
            ),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Header { .. } | Error::FormatData { .. } | Error::Parse(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
