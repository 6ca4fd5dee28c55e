// Record sources: turn raw trace inputs into VM metadata plus per-thread
// ordered trace points. The binary decoder itself plugs in via TraceFormat.

mod block_reader;
pub mod error;
mod format;
pub mod format_files;
mod jsonl;
mod traits;

pub use block_reader::{BlockTraceReader, INITIAL_HEADER_BLOCK};
pub use error::{Error, Result};
pub use format::{BlockOutcome, DecodeContext, HeaderProbe, TraceFormat};
pub use format_files::FormatFile;
pub use jsonl::{JsonlRecord, JsonlTraceSource, to_jsonl};
pub use mtrace_types::{DecodeStats, DecodedThread, DecodedTrace};
pub use traits::{RecordSource, SourceOptions};
