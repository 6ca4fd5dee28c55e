use mtrace_engine::{
    RECONSTRUCT_COMPONENTS, RENDER_COMPONENTS, ReconstructState, StackScope, StatsBuilder,
    StatsTable, TraceRenderer, format_session_info,
};
use mtrace_index::{INFO_KEY_VM, QueryTable, SessionStore};
use mtrace_source::{RecordSource, SourceOptions};
use mtrace_types::{CancellationToken, MethodInvocation, desanitize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::ops::{ImportProgress, ImportReport, ImportService, validate_session_name};
use crate::{Error, Result};

/// File-name suffix of session stores; the rest of the name is the session name.
pub const STORE_SUFFIX: &str = ".fmt.db";

/// A store file that discovery could not load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStore {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Newly registered session names, in file-name order
    pub loaded: Vec<String>,
    pub skipped: Vec<SkippedStore>,
}

/// One line of the session listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub name: String,
    pub path: Option<PathBuf>,
    pub vm: String,
    pub threads: usize,
    pub points: u64,
}

/// Session registry for one workspace directory.
///
/// Owns every open session store for as long as it lives. Dropping the
/// workspace closes them all.
pub struct Workspace {
    root: PathBuf,
    sessions: BTreeMap<String, SessionStore>,
}

impl Workspace {
    /// Open (creating if needed) a workspace directory. No stores are loaded
    /// until [`discover`](Self::discover) runs.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            sessions: BTreeMap::new(),
        })
    }

    /// Open a workspace and load every valid store in it.
    pub fn open_and_discover(root: impl Into<PathBuf>) -> Result<(Self, DiscoveryReport)> {
        let mut workspace = Self::open(root)?;
        let report = workspace.discover()?;
        Ok((workspace, report))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the store for `name` lives.
    pub fn store_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}{}", name, STORE_SUFFIX))
    }

    /// Register every store file in the workspace that is not loaded yet.
    ///
    /// Candidates that fail to open or lack the marker table are skipped and
    /// reported one by one; only an unreadable workspace directory is an error.
    pub fn discover(&mut self) -> Result<DiscoveryReport> {
        let mut report = DiscoveryReport::default();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "cannot read workspace {}: {}",
                    self.root.display(),
                    e
                )))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = session_name_from_path(entry.path()) else {
                continue;
            };
            if self.sessions.contains_key(&name) {
                continue;
            }

            match SessionStore::open(entry.path()) {
                Ok(store) => {
                    debug!(session = %name, path = %entry.path().display(), "session loaded");
                    self.sessions.insert(name.clone(), store);
                    report.loaded.push(name);
                }
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "skipping session store");
                    report.skipped.push(SkippedStore {
                        path: entry.path().to_path_buf(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "workspace discovery finished"
        );
        Ok(report)
    }

    pub fn get(&self, name: &str) -> Option<&SessionStore> {
        self.sessions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sessions.contains_key(name)
    }

    /// Registered session names, sorted.
    pub fn session_names(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    pub fn summaries(&self) -> Result<Vec<SessionSummary>> {
        let mut summaries = Vec::with_capacity(self.sessions.len());
        for (name, store) in &self.sessions {
            summaries.push(SessionSummary {
                name: name.clone(),
                path: store.path().map(Path::to_path_buf),
                vm: store
                    .info_value(INFO_KEY_VM)?
                    .map(|v| desanitize(&v))
                    .unwrap_or_default(),
                threads: store.threads()?.len(),
                points: store.point_count()?,
            });
        }
        Ok(summaries)
    }

    /// Release one session's handle. Returns false for unknown names.
    pub fn close(&mut self, name: &str) -> Result<bool> {
        match self.sessions.remove(name) {
            Some(store) => {
                store.close()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn close_all(&mut self) -> Result<()> {
        let sessions = std::mem::take(&mut self.sessions);
        let mut first_error = None;
        for (name, store) in sessions {
            if let Err(err) = store.close() {
                warn!(session = %name, error = %err, "failed to close session store");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Decode `inputs` and persist them as session `name`, replacing any
    /// existing session of that name.
    ///
    /// Nothing is touched until decoding succeeded. After that the old store
    /// is deleted before the new one is written, so a failed write loses it.
    pub fn import<F>(
        &mut self,
        source: &dyn RecordSource,
        inputs: &[PathBuf],
        name: &str,
        options: &SourceOptions,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<ImportReport>
    where
        F: FnMut(ImportProgress),
    {
        validate_session_name(name)?;
        let service = ImportService::new(source, options, cancel);
        let trace = service.decode(inputs, &mut on_progress)?;

        let target = self.store_path(name);
        // Discovery may have registered the store under a differently cased suffix
        let registered = self
            .sessions
            .get(name)
            .and_then(|store| store.path().map(Path::to_path_buf));
        self.close(name)?;

        let mut stale: Vec<PathBuf> = registered.into_iter().collect();
        if !stale.contains(&target) {
            stale.push(target.clone());
        }
        stale.retain(|path| path.exists());
        let replaced = !stale.is_empty();
        for path in stale {
            // Both names may point at one file on case-insensitive filesystems
            if !path.exists() {
                continue;
            }
            on_progress(ImportProgress::Replacing { path: path.clone() });
            info!(session = name, path = %path.display(), "deleting existing session store");
            std::fs::remove_file(&path)?;
        }

        let summary = service.persist(name, &trace, &target, &mut on_progress)?;

        let store = SessionStore::open(&target)?;
        self.sessions.insert(name.to_string(), store);

        Ok(ImportReport {
            name: name.to_string(),
            path: target,
            threads: summary.threads,
            points: summary.points,
            decode: trace.stats,
            replaced,
        })
    }

    /// Rebuild the invocation list of a session. `None` for unknown names.
    pub fn reconstruct(
        &self,
        name: &str,
        scope: StackScope,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<MethodInvocation>>> {
        let Some(store) = self.sessions.get(name) else {
            return Ok(None);
        };
        let state = store.fold_points(
            RECONSTRUCT_COMPONENTS,
            cancel,
            ReconstructState::new(scope),
            ReconstructState::step,
        )?;
        Ok(Some(state.finish()))
    }

    /// Render a session's method trace. `None` for unknown names.
    pub fn render_trace(
        &self,
        name: &str,
        indent: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let Some(store) = self.sessions.get(name) else {
            return Ok(None);
        };
        let renderer = store.fold_points(
            RENDER_COMPONENTS,
            cancel,
            TraceRenderer::new(indent),
            TraceRenderer::step,
        )?;
        Ok(Some(renderer.finish()))
    }

    /// Method entry counts across sessions, one column per known session
    /// in argument order. Unknown names get no column.
    pub fn invocation_stats<S: AsRef<str>>(&self, names: &[S]) -> Result<StatsTable> {
        let mut builder = StatsBuilder::new();
        for name in names {
            let name = name.as_ref();
            match self.sessions.get(name) {
                Some(store) => {
                    builder = builder.add_session(name, store.method_entry_counts()?);
                }
                None => warn!(session = name, "unknown session skipped in statistics"),
            }
        }
        Ok(builder.finish())
    }

    /// Metadata dump of a session. `None` for unknown names.
    pub fn session_info(&self, name: &str) -> Result<Option<String>> {
        let Some(store) = self.sessions.get(name) else {
            return Ok(None);
        };
        let entries = store.info_entries()?;
        Ok(Some(format_session_info(
            entries.iter().map(|e| (e.key.as_str(), e.value.as_str())),
        )))
    }

    /// Read-only ad-hoc query. `None` for unknown names.
    pub fn raw_query(&self, name: &str, sql: &str) -> Result<Option<QueryTable>> {
        let Some(store) = self.sessions.get(name) else {
            return Ok(None);
        };
        Ok(Some(store.raw_query(sql)?))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = self.close_all();
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("sessions", &self.sessions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Session name for a store file, matching the suffix case-insensitively.
fn session_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let split = file_name.len().checked_sub(STORE_SUFFIX.len())?;
    if !file_name.is_char_boundary(split) {
        return None;
    }
    let (stem, suffix) = file_name.split_at(split);
    if stem.is_empty() || !suffix.eq_ignore_ascii_case(STORE_SUFFIX) {
        return None;
    }
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_from_path() {
        assert_eq!(
            session_name_from_path(Path::new("/ws/run-1.fmt.db")).as_deref(),
            Some("run-1")
        );
        assert_eq!(
            session_name_from_path(Path::new("/ws/Run.FMT.DB")).as_deref(),
            Some("Run")
        );
        assert_eq!(session_name_from_path(Path::new("/ws/.fmt.db")), None);
        assert_eq!(session_name_from_path(Path::new("/ws/run.fmt.db.partial")), None);
        assert_eq!(session_name_from_path(Path::new("/ws/config.toml")), None);
        assert_eq!(session_name_from_path(Path::new("/ws/db")), None);
    }
}
