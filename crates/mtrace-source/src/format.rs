use mtrace_types::{ThreadRecord, TimezoneOffset, TracePoint, VmInfo};
use std::path::Path;

use crate::Result;

/// Outcome of probing the start of a trace file for its header.
#[derive(Debug)]
pub enum HeaderProbe<H> {
    /// Header fully parsed
    Parsed(H),
    /// Block too small to hold the header; retry with a larger one
    Underflow,
    /// Not a trace file
    Invalid(String),
}

/// Outcome of decoding one fixed-size data block.
#[derive(Debug)]
pub enum BlockOutcome {
    /// Block decoded into points of a single thread
    Decoded {
        thread: ThreadRecord,
        points: Vec<TracePoint>,
    },
    /// Block is valid but carries nothing to keep (padding, filtered)
    Empty,
    /// Block is malformed; the reader logs it and moves to the next offset
    Corrupt(String),
}

/// Per-import settings visible to the decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeContext {
    pub timezone: TimezoneOffset,
}

/// Seam to a binary trace decoder.
///
/// The reader drives the file IO (header block growth, record stepping); the
/// format only interprets bytes.
pub trait TraceFormat: Clone {
    type Header;

    /// Load one trace-format description file before decoding starts.
    fn load_format_data(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn probe_header(&self, bytes: &[u8]) -> HeaderProbe<Self::Header>;

    /// Byte length of the header; the first data block starts here
    fn header_size(&self, header: &Self::Header) -> u64;

    /// Fixed byte length of every data block
    fn record_size(&self, header: &Self::Header) -> u64;

    fn vm_info(&self, header: &Self::Header) -> VmInfo;

    fn decode_block(
        &self,
        header: &Self::Header,
        block: &[u8],
        context: &DecodeContext,
    ) -> BlockOutcome;
}
