use mtrace_types::{DecodedTrace, ThreadRecord, TracePoint, VmInfo};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::traits::{RecordSource, SourceOptions, display_name};
use crate::{Error, Result};

/// One line of a pre-decoded trace export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum JsonlRecord {
    Vm(VmInfo),
    Thread(ThreadRecord),
    Point(TracePoint),
}

/// Record source for traces already decoded into JSON Lines.
///
/// Every input must carry a `vm` line before its first thread or point; the
/// first file's VM metadata wins. Formatted times are taken as exported, so
/// the timezone option has no effect here.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlTraceSource;

impl JsonlTraceSource {
    pub fn new() -> Self {
        Self
    }
}

impl RecordSource for JsonlTraceSource {
    fn id(&self) -> &'static str {
        "jsonl"
    }

    fn load(&self, inputs: &[PathBuf], options: &SourceOptions) -> Result<DecodedTrace> {
        if inputs.is_empty() {
            return Err(Error::Parse("no trace input files given".to_string()));
        }
        if options.timezone.minutes() != 0 {
            debug!("timezone offset ignored for pre-decoded input");
        }

        let mut trace: Option<DecodedTrace> = None;

        for path in inputs {
            let content = fs::read_to_string(path).map_err(|e| Error::Header {
                path: path.clone(),
                message: e.to_string(),
            })?;
            if content.trim().is_empty() {
                return Err(Error::Header {
                    path: path.clone(),
                    message: "empty trace file".to_string(),
                });
            }

            let mut seen_vm = false;
            for (index, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let record: JsonlRecord = serde_json::from_str(line).map_err(|e| {
                    Error::Parse(format!("{}:{}: {}", display_name(path), index + 1, e))
                })?;

                match record {
                    JsonlRecord::Vm(vm) => {
                        seen_vm = true;
                        if trace.is_none() {
                            trace = Some(DecodedTrace::new(vm));
                        }
                    }
                    JsonlRecord::Thread(thread) => {
                        let trace = require_header(&mut trace, seen_vm, path)?;
                        if options.threads.admits(thread.id) {
                            let record = thread.clone();
                            trace.thread_mut(record).thread = thread;
                        }
                    }
                    JsonlRecord::Point(point) => {
                        let trace = require_header(&mut trace, seen_vm, path)?;
                        trace.stats.records += 1;
                        trace.stats.bytes += line.len() as u64;
                        if options.threads.admits(point.thread_id) {
                            trace.push_point(point);
                        }
                    }
                }
            }

            if !seen_vm {
                warn!(file = %display_name(path), "input has no vm record");
            }
        }

        let trace = trace.ok_or_else(|| Error::Header {
            path: inputs[0].clone(),
            message: "missing vm record".to_string(),
        })?;
        info!(
            records = trace.stats.records,
            threads = trace.threads.len(),
            "loaded pre-decoded trace"
        );
        Ok(trace)
    }
}

fn require_header<'a>(
    trace: &'a mut Option<DecodedTrace>,
    seen_vm: bool,
    path: &std::path::Path,
) -> Result<&'a mut DecodedTrace> {
    match trace {
        Some(trace) if seen_vm => Ok(trace),
        _ => Err(Error::Header {
            path: path.to_path_buf(),
            message: "vm record must precede threads and points".to_string(),
        }),
    }
}

/// Serialize a decoded trace back into JSON Lines.
pub fn to_jsonl(trace: &DecodedTrace) -> Result<String> {
    let mut out = String::new();
    let mut push = |record: &JsonlRecord| -> Result<()> {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
        Ok(())
    };

    push(&JsonlRecord::Vm(trace.vm.clone()))?;
    for thread in &trace.threads {
        push(&JsonlRecord::Thread(thread.thread.clone()))?;
    }
    for thread in &trace.threads {
        for point in &thread.points {
            push(&JsonlRecord::Point(point.clone()))?;
        }
    }
    Ok(out)
}
