// SQLite session store
// One database file per imported trace; the schema is shared with existing
// session files and must not change shape.

mod error;
mod queries;
mod records;
mod schema;
mod store;

// Public API
pub use error::{Error, Result};
pub use records::{InfoEntry, QueryTable, WriteSummary};
pub use schema::{INFO_KEY_NAME, INFO_KEY_SUMMARY, INFO_KEY_VM};
pub use store::SessionStore;
