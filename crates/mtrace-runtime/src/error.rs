use std::fmt;

/// Result type for mtrace-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Session store error
    Index(mtrace_index::Error),

    /// Record source (decode) error
    Source(mtrace_source::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Invalid operation or input
    InvalidOperation(String),

    /// The operation observed its cancellation token
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Index(err) => write!(f, "Index error: {}", err),
            Error::Source(err) => write!(f, "Import failed: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::Source(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::InvalidOperation(_) | Error::Cancelled => None,
        }
    }
}

impl From<mtrace_index::Error> for Error {
    fn from(err: mtrace_index::Error) -> Self {
        match err {
            mtrace_index::Error::Cancelled => Error::Cancelled,
            other => Error::Index(other),
        }
    }
}

impl From<mtrace_source::Error> for Error {
    fn from(err: mtrace_source::Error) -> Self {
        Error::Source(err)
    }
}

impl From<mtrace_types::Error> for Error {
    fn from(err: mtrace_types::Error) -> Self {
        match err {
            mtrace_types::Error::Cancelled => Error::Cancelled,
            mtrace_types::Error::Parse(msg) => Error::Config(msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
