use std::fmt;
use std::path::PathBuf;

/// Result type for mtrace-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the store layer
#[derive(Debug)]
pub enum Error {
    /// Database operation failed
    Database(rusqlite::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Query-specific error (rejected statement, bad input)
    Query(String),

    /// File opened fine but lacks the session marker table
    NotASessionStore(PathBuf),

    /// A scan or write observed its cancellation token
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database(err) => {
                let msg = err.to_string();
                // Stores written by other tools may lack expected tables or columns
                if msg.contains("no such column") || msg.contains("no such table") {
                    write!(
                        f,
                        "Session store schema mismatch: {}. Re-import the trace to rebuild it.",
                        msg
                    )
                } else {
                    write!(f, "Database error: {}", err)
                }
            }
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Query(msg) => write!(f, "Query error: {}", msg),
            Error::NotASessionStore(path) => {
                write!(f, "Not a session store (no info table): {}", path.display())
            }
            Error::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Query(_) | Error::NotASessionStore(_) | Error::Cancelled => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<mtrace_types::Error> for Error {
    fn from(err: mtrace_types::Error) -> Self {
        match err {
            mtrace_types::Error::Cancelled => Error::Cancelled,
            mtrace_types::Error::Parse(msg) => Error::Query(msg),
        }
    }
}
