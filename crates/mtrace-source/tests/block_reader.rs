//! Block reader behavior against a small fixed-record test format.
//!
//! Layout: `MTRC`, u32 header length, u32 record size, VM version bytes up to
//! the header length. Each record: kind byte (`E`/`X`, anything else is
//! corrupt), u64 thread id, u64 raw time, then a NUL-padded method name.

use mtrace_source::{
    BlockOutcome, BlockTraceReader, DecodeContext, Error, FormatFile, HeaderProbe, RecordSource,
    SourceOptions, TraceFormat,
};
use mtrace_types::{PointType, ThreadFilter, ThreadRecord, TracePoint, VmInfo};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

const RECORD_SIZE: usize = 48;

#[derive(Clone, Default)]
struct ToyFormat {
    probes: Rc<RefCell<Vec<usize>>>,
    loaded_format_files: Rc<RefCell<Vec<PathBuf>>>,
}

struct ToyHeader {
    header_len: u64,
    record_size: u64,
    version: String,
}

impl TraceFormat for ToyFormat {
    type Header = ToyHeader;

    fn load_format_data(&mut self, path: &Path) -> mtrace_source::Result<()> {
        self.loaded_format_files.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn probe_header(&self, bytes: &[u8]) -> HeaderProbe<ToyHeader> {
        self.probes.borrow_mut().push(bytes.len());
        if bytes.len() < 12 {
            return HeaderProbe::Underflow;
        }
        if &bytes[..4] != b"MTRC" {
            return HeaderProbe::Invalid("bad magic".to_string());
        }
        let header_len = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        let record_size = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as u64;
        if bytes.len() < header_len {
            return HeaderProbe::Underflow;
        }
        let version = String::from_utf8_lossy(&bytes[12..header_len])
            .trim_end_matches('\0')
            .to_string();
        HeaderProbe::Parsed(ToyHeader {
            header_len: header_len as u64,
            record_size,
            version,
        })
    }

    fn header_size(&self, header: &ToyHeader) -> u64 {
        header.header_len
    }

    fn record_size(&self, header: &ToyHeader) -> u64 {
        header.record_size
    }

    fn vm_info(&self, header: &ToyHeader) -> VmInfo {
        VmInfo {
            version: header.version.clone(),
            summary: "toy trace".to_string(),
        }
    }

    fn decode_block(
        &self,
        _header: &ToyHeader,
        block: &[u8],
        _context: &DecodeContext,
    ) -> BlockOutcome {
        let kind = match block[0] {
            b'E' => PointType::Entry,
            b'X' => PointType::Exit,
            other => return BlockOutcome::Corrupt(format!("unknown kind byte {:#x}", other)),
        };
        let thread_id = i64::from_le_bytes(block[1..9].try_into().unwrap());
        let raw_time = i64::from_le_bytes(block[9..17].try_into().unwrap());
        let name = String::from_utf8_lossy(&block[17..])
            .trim_end_matches('\0')
            .to_string();
        let (class_name, method_name) = name.split_once('.').unwrap_or((name.as_str(), ""));

        BlockOutcome::Decoded {
            thread: ThreadRecord {
                id: thread_id,
                native_id: thread_id + 1000,
                name: format!("thread-{}", thread_id),
            },
            points: vec![TracePoint {
                tp_id: raw_time,
                component: "mt".to_string(),
                container_component: "j9vm".to_string(),
                debug_info: String::new(),
                formatted_parameters: format!(">{}", name),
                parameters: vec![class_name.to_string(), method_name.to_string(), "()V".to_string()],
                formatted_time: raw_time.to_string(),
                raw_time,
                groups: vec![],
                kind,
                thread_id,
            }],
        }
    }
}

fn header_bytes(header_len: usize, version: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(header_len);
    bytes.extend_from_slice(b"MTRC");
    bytes.extend_from_slice(&(header_len as u32).to_le_bytes());
    bytes.extend_from_slice(&(RECORD_SIZE as u32).to_le_bytes());
    bytes.extend_from_slice(version.as_bytes());
    bytes.resize(header_len, 0);
    bytes
}

fn record(kind: u8, thread_id: i64, raw_time: i64, name: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(RECORD_SIZE);
    bytes.push(kind);
    bytes.extend_from_slice(&thread_id.to_le_bytes());
    bytes.extend_from_slice(&raw_time.to_le_bytes());
    bytes.extend_from_slice(name.as_bytes());
    bytes.resize(RECORD_SIZE, 0);
    bytes
}

fn write_trace(dir: &TempDir, name: &str, parts: &[Vec<u8>]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for part in parts {
        file.write_all(part).unwrap();
    }
    path
}

#[test]
fn test_small_file_falls_back_to_whole_file_read() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(
        &dir,
        "small.trc",
        &[
            header_bytes(64, "JRE 1.8.0 toy"),
            record(b'E', 1, 10, "A.foo"),
            record(b'X', 1, 20, "A.foo"),
        ],
    );
    let format = ToyFormat::default();
    let reader = BlockTraceReader::new(format.clone());

    let trace = reader.load(&[path], &SourceOptions::default()).unwrap();

    // File is shorter than the first 4000 byte probe, so only one whole-file read
    assert_eq!(*format.probes.borrow(), vec![64 + 2 * RECORD_SIZE]);
    assert_eq!(trace.vm.version, "JRE 1.8.0 toy");
    assert_eq!(trace.threads.len(), 1);
    assert_eq!(trace.threads[0].points.len(), 2);
    assert_eq!(trace.stats.records, 2);
}

#[test]
fn test_large_header_doubles_probe_block() {
    let dir = TempDir::new().unwrap();
    let mut parts = vec![header_bytes(6000, "big header")];
    for i in 0..200 {
        parts.push(record(b'E', 1, i, "A.foo"));
    }
    let path = write_trace(&dir, "big.trc", &parts);
    let format = ToyFormat::default();
    let reader = BlockTraceReader::new(format.clone());

    let trace = reader.load(&[path], &SourceOptions::default()).unwrap();

    assert_eq!(*format.probes.borrow(), vec![4000, 8000]);
    assert_eq!(trace.vm.version, "big header");
    assert_eq!(trace.point_count(), 200);
}

#[test]
fn test_corrupt_block_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(
        &dir,
        "corrupt.trc",
        &[
            header_bytes(64, "v"),
            record(b'E', 1, 10, "A.foo"),
            record(b'?', 1, 15, "garbage"),
            record(b'X', 1, 20, "A.foo"),
        ],
    );
    let reader = BlockTraceReader::new(ToyFormat::default());

    let trace = reader.load(&[path], &SourceOptions::default()).unwrap();

    assert_eq!(trace.stats.records, 3);
    assert_eq!(trace.stats.corrupt_blocks, 1);
    let times: Vec<i64> = trace.threads[0].points.iter().map(|p| p.raw_time).collect();
    assert_eq!(times, vec![10, 20]);
}

#[test]
fn test_points_grouped_per_thread_in_first_seen_order() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(
        &dir,
        "threads.trc",
        &[
            header_bytes(64, "v"),
            record(b'E', 2, 1, "B.bar"),
            record(b'E', 1, 2, "A.foo"),
            record(b'X', 2, 3, "B.bar"),
        ],
    );
    let reader = BlockTraceReader::new(ToyFormat::default());

    let trace = reader.load(&[path], &SourceOptions::default()).unwrap();

    let ids: Vec<i64> = trace.threads.iter().map(|t| t.thread.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(trace.threads[0].points.len(), 2);
    assert_eq!(trace.threads[0].thread.native_id, 1002);
}

#[test]
fn test_thread_filter_applies() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(
        &dir,
        "filtered.trc",
        &[
            header_bytes(64, "v"),
            record(b'E', 1, 1, "A.foo"),
            record(b'E', 2, 2, "B.bar"),
        ],
    );
    let options = SourceOptions {
        threads: ThreadFilter::parse("0x2").unwrap(),
        ..SourceOptions::default()
    };

    let trace = BlockTraceReader::new(ToyFormat::default())
        .load(&[path], &options)
        .unwrap();

    assert_eq!(trace.threads.len(), 1);
    assert_eq!(trace.threads[0].thread.id, 2);
}

#[test]
fn test_bad_magic_is_fatal_and_names_file() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(&dir, "notatrace.bin", &[b"hello world, not a trace".to_vec()]);

    let err = BlockTraceReader::new(ToyFormat::default())
        .load(&[path], &SourceOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::Header { .. }));
    assert!(err.to_string().contains("notatrace.bin"));
}

#[test]
fn test_empty_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(&dir, "empty.trc", &[]);

    let err = BlockTraceReader::new(ToyFormat::default())
        .load(&[path], &SourceOptions::default())
        .unwrap_err();

    assert!(err.to_string().contains("empty trace file"));
}

#[test]
fn test_truncated_header_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut header = header_bytes(600, "v");
    header.truncate(100);
    let path = write_trace(&dir, "truncated.trc", &[header]);

    let err = BlockTraceReader::new(ToyFormat::default())
        .load(&[path], &SourceOptions::default())
        .unwrap_err();

    assert!(err.to_string().contains("premature end of file"));
}

#[test]
fn test_missing_optional_format_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(&dir, "ok.trc", &[header_bytes(64, "v"), record(b'E', 1, 1, "A.foo")]);
    let present = dir.path().join("J9TraceFormat.dat");
    std::fs::write(&present, b"formats").unwrap();

    let format = ToyFormat::default();
    let options = SourceOptions {
        format_files: vec![
            FormatFile::required(&present),
            FormatFile::optional(dir.path().join("TraceFormat.dat")),
        ],
        ..SourceOptions::default()
    };

    let trace = BlockTraceReader::new(format.clone())
        .load(&[path], &options)
        .unwrap();

    assert_eq!(trace.point_count(), 1);
    assert_eq!(*format.loaded_format_files.borrow(), vec![present]);
}

#[test]
fn test_missing_required_format_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(&dir, "ok.trc", &[header_bytes(64, "v"), record(b'E', 1, 1, "A.foo")]);
    let options = SourceOptions {
        format_files: vec![FormatFile::required(dir.path().join("OMRTraceFormat.dat"))],
        ..SourceOptions::default()
    };

    let err = BlockTraceReader::new(ToyFormat::default())
        .load(&[path], &options)
        .unwrap_err();

    assert!(matches!(err, Error::FormatData { .. }));
}
