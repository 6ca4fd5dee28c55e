use mtrace_index::{SessionStore, WriteSummary};
use mtrace_source::{RecordSource, SourceOptions};
use mtrace_types::{CancellationToken, DecodeStats, DecodedTrace};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub enum ImportProgress {
    Decoding {
        source: &'static str,
        inputs: usize,
    },
    Decoded {
        threads: usize,
        points: usize,
        corrupt_blocks: u64,
    },
    Replacing {
        path: PathBuf,
    },
    Writing {
        path: PathBuf,
    },
    Committed {
        threads: usize,
        points: usize,
    },
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub name: String,
    pub path: PathBuf,
    pub threads: usize,
    pub points: usize,
    pub decode: DecodeStats,
    /// An older store of the same name was deleted
    pub replaced: bool,
}

/// Decode raw inputs and persist them as one session store file.
///
/// The store is written next to its final location under a `.partial`
/// name and only renamed into place after the transaction committed, so a
/// failed import never leaves a half-written store where discovery looks.
pub struct ImportService<'a> {
    source: &'a dyn RecordSource,
    options: &'a SourceOptions,
    cancel: &'a CancellationToken,
}

impl<'a> ImportService<'a> {
    pub fn new(
        source: &'a dyn RecordSource,
        options: &'a SourceOptions,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            source,
            options,
            cancel,
        }
    }

    pub fn decode<F>(&self, inputs: &[PathBuf], on_progress: &mut F) -> Result<DecodedTrace>
    where
        F: FnMut(ImportProgress),
    {
        if inputs.is_empty() {
            return Err(Error::InvalidOperation(
                "no trace input files given".to_string(),
            ));
        }
        self.cancel.check()?;

        on_progress(ImportProgress::Decoding {
            source: self.source.id(),
            inputs: inputs.len(),
        });
        let trace = self.source.load(inputs, self.options)?;

        if trace.stats.corrupt_blocks > 0 {
            warn!(
                corrupt_blocks = trace.stats.corrupt_blocks,
                "trace decoded with corrupt blocks skipped"
            );
        }
        on_progress(ImportProgress::Decoded {
            threads: trace.threads.len(),
            points: trace.point_count(),
            corrupt_blocks: trace.stats.corrupt_blocks,
        });
        Ok(trace)
    }

    /// Write `trace` to `target`, which must not exist yet.
    pub fn persist<F>(
        &self,
        name: &str,
        trace: &DecodedTrace,
        target: &Path,
        on_progress: &mut F,
    ) -> Result<WriteSummary>
    where
        F: FnMut(ImportProgress),
    {
        let partial = partial_path(target);
        if partial.exists() {
            warn!(path = %partial.display(), "removing stale partial store");
            std::fs::remove_file(&partial)?;
        }

        on_progress(ImportProgress::Writing {
            path: target.to_path_buf(),
        });

        let written = write_store(&partial, name, trace, self.cancel)
            .and_then(|summary| {
                std::fs::rename(&partial, target)?;
                Ok(summary)
            });

        match written {
            Ok(summary) => {
                info!(
                    session = name,
                    threads = summary.threads,
                    points = summary.points,
                    "session imported"
                );
                on_progress(ImportProgress::Committed {
                    threads: summary.threads,
                    points: summary.points,
                });
                Ok(summary)
            }
            Err(err) => {
                if partial.exists()
                    && let Err(cleanup) = std::fs::remove_file(&partial)
                {
                    warn!(path = %partial.display(), error = %cleanup, "could not remove partial store");
                }
                Err(err)
            }
        }
    }
}

fn write_store(
    path: &Path,
    name: &str,
    trace: &DecodedTrace,
    cancel: &CancellationToken,
) -> Result<WriteSummary> {
    let mut store = SessionStore::create(path)?;
    let summary = store.write_trace(name, trace, cancel)?;
    store.close()?;
    Ok(summary)
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Session names become file names; reject anything that is not a plain one.
pub fn validate_session_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(Error::InvalidOperation(format!(
            "invalid session name '{}': {}",
            name, reason
        )))
    };

    if name.trim().is_empty() {
        return invalid("name is empty");
    }
    if name != name.trim() {
        return invalid("leading or trailing whitespace");
    }
    if name == "." || name == ".." {
        return invalid("reserved name");
    }
    if name.contains(['/', '\\', '\0']) {
        return invalid("path separators are not allowed");
    }
    Ok(())
}
