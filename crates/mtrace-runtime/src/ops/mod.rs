mod import;

pub use import::{ImportProgress, ImportReport, ImportService, validate_session_name};
