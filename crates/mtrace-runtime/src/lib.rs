pub mod config;
pub mod error;
pub mod ops;
pub mod workspace;

pub use config::{Config, resolve_workspace_path};
pub use error::{Error, Result};
pub use ops::{ImportProgress, ImportReport, ImportService, validate_session_name};
pub use workspace::{DiscoveryReport, STORE_SUFFIX, SessionSummary, SkippedStore, Workspace};
