use mtrace_types::DecodedTrace;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::format::{BlockOutcome, DecodeContext, HeaderProbe, TraceFormat};
use crate::format_files::FormatFile;
use crate::traits::{RecordSource, SourceOptions, display_name};
use crate::{Error, Result};

/// First header probe size in bytes; doubled on every underflow.
pub const INITIAL_HEADER_BLOCK: u64 = 4000;

/// Record source for fixed-record binary trace files.
///
/// The first input carries the header that fixes header and record sizes for
/// every input. Data blocks are visited at `header_size + n * record_size`;
/// the offset advances by one record whether or not the block decoded.
#[derive(Debug, Clone)]
pub struct BlockTraceReader<F> {
    format: F,
}

/// Header read as a bounded state machine: the probe block doubles until it
/// exceeds the file, after which the whole file is tried exactly once.
enum HeaderStep<H> {
    Probe(u64),
    WholeFile,
    Done(H),
}

impl<F: TraceFormat> BlockTraceReader<F> {
    pub fn new(format: F) -> Self {
        Self { format }
    }

    fn prepare_format(&self, files: &[FormatFile]) -> Result<F> {
        let mut format = self.format.clone();
        for file in files {
            if !file.path.exists() {
                if file.required {
                    return Err(Error::FormatData {
                        path: file.path.clone(),
                        message: "file not found".to_string(),
                    });
                }
                warn!(path = %file.path.display(), "trace format file not found, continuing without it");
                continue;
            }
            format.load_format_data(&file.path).map_err(|e| Error::FormatData {
                path: file.path.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(format)
    }

    fn scan_file(
        &self,
        format: &F,
        header: &F::Header,
        path: &Path,
        file: &mut File,
        options: &SourceOptions,
        trace: &mut DecodedTrace,
    ) -> Result<()> {
        let length = file.metadata()?.len();
        let header_size = format.header_size(header);
        let record_size = format.record_size(header);
        if record_size == 0 {
            return Err(header_error(path, "header declares a zero record size"));
        }

        if length.saturating_sub(header_size) % record_size != 0 {
            warn!(
                file = %display_name(path),
                "body of the trace file is not a multiple of the record size, file either truncated or corrupt"
            );
        }

        let context = DecodeContext {
            timezone: options.timezone,
        };
        let mut block = vec![0u8; record_size as usize];
        let mut offset = header_size;

        while offset < length {
            file.seek(SeekFrom::Start(offset))?;
            match file.read_exact(&mut block) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    warn!(file = %display_name(path), offset, "truncated trailing block ignored");
                    trace.stats.corrupt_blocks += 1;
                    break;
                }
                Err(e) => return Err(e.into()),
            }

            match format.decode_block(header, &block, &context) {
                BlockOutcome::Decoded { thread, points } => {
                    if options.threads.admits(thread.id) {
                        trace.thread_mut(thread).points.extend(points);
                    }
                }
                BlockOutcome::Empty => {}
                BlockOutcome::Corrupt(message) => {
                    error!(
                        file = %display_name(path),
                        offset,
                        "bad block of trace data: {}",
                        message
                    );
                    trace.stats.corrupt_blocks += 1;
                }
            }

            offset += record_size;
            trace.stats.bytes += record_size;
            trace.stats.records += 1;
        }

        Ok(())
    }
}

impl<F: TraceFormat> RecordSource for BlockTraceReader<F> {
    fn id(&self) -> &'static str {
        "block"
    }

    fn load(&self, inputs: &[PathBuf], options: &SourceOptions) -> Result<DecodedTrace> {
        if inputs.is_empty() {
            return Err(Error::Parse("no trace input files given".to_string()));
        }

        let mut files = inputs
            .iter()
            .map(|path| {
                File::open(path)
                    .map(|file| (path.as_path(), file))
                    .map_err(|e| header_error(path, e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let format = self.prepare_format(&options.format_files)?;

        let header = {
            let (path, file) = &mut files[0];
            read_header(&format, path, file)?
        };
        let mut trace = DecodedTrace::new(format.vm_info(&header));

        for (path, file) in files.iter_mut() {
            debug!(file = %display_name(path), "scanning trace blocks");
            self.scan_file(&format, &header, path, file, options, &mut trace)?;
        }

        info!(
            records = trace.stats.records,
            bytes = trace.stats.bytes,
            corrupt_blocks = trace.stats.corrupt_blocks,
            threads = trace.threads.len(),
            "decoded trace input"
        );
        Ok(trace)
    }
}

fn read_header<F: TraceFormat>(format: &F, path: &Path, file: &mut File) -> Result<F::Header> {
    let length = file
        .metadata()
        .map_err(|e| header_error(path, e.to_string()))?
        .len();
    if length == 0 {
        return Err(header_error(path, "empty trace file"));
    }

    let mut step = HeaderStep::Probe(INITIAL_HEADER_BLOCK);
    loop {
        step = match step {
            HeaderStep::Probe(block) if block > length => HeaderStep::WholeFile,
            HeaderStep::Probe(block) => {
                let bytes = read_prefix(file, block).map_err(|e| header_error(path, e.to_string()))?;
                match format.probe_header(&bytes) {
                    HeaderProbe::Parsed(header) => HeaderStep::Done(header),
                    HeaderProbe::Underflow => {
                        debug!(block, "trace header underflow, doubling block");
                        HeaderStep::Probe(block * 2)
                    }
                    HeaderProbe::Invalid(message) => return Err(header_error(path, message)),
                }
            }
            HeaderStep::WholeFile => {
                let bytes = read_prefix(file, length).map_err(|e| header_error(path, e.to_string()))?;
                match format.probe_header(&bytes) {
                    HeaderProbe::Parsed(header) => HeaderStep::Done(header),
                    HeaderProbe::Underflow => {
                        return Err(header_error(path, "received premature end of file"));
                    }
                    HeaderProbe::Invalid(message) => return Err(header_error(path, message)),
                }
            }
            HeaderStep::Done(header) => return Ok(header),
        };
    }
}

fn read_prefix(file: &mut File, len: u64) -> std::io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::with_capacity(len as usize);
    file.by_ref().take(len).read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn header_error(path: &Path, message: impl Into<String>) -> Error {
    Error::Header {
        path: path.to_path_buf(),
        message: message.into(),
    }
}
