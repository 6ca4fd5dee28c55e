//! Testing infrastructure for mtrace integration tests.
//!
//! - `TestWorld`: isolated workspace plus input directory, and CLI command setup
//! - `fixtures`: `TraceBuilder` for decoded traces with well-formed call trees

pub mod fixtures;
pub mod world;

pub use fixtures::{TraceBuilder, sample_trace};
pub use world::TestWorld;
