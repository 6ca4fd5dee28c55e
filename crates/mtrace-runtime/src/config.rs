use crate::{Error, Result};
use mtrace_engine::StackScope;
use mtrace_source::{FormatFile, SourceOptions, format_files};
use mtrace_types::{ThreadFilter, TimezoneOffset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the workspace directory.
pub const WORKSPACE_ENV: &str = "MTRACE_WORKSPACE";

/// File name of the workspace configuration.
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the workspace directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. MTRACE_WORKSPACE environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.mtrace (fallback for systems without XDG)
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(WORKSPACE_ENV)
        && !env_path.trim().is_empty()
    {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("mtrace"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".mtrace"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Workspace defaults, stored as `config.toml` in the workspace directory.
///
/// `jre_home` and `timezone` are only read by binary decoders
/// (`BlockTraceReader`); pre-decoded JSON Lines input already carries its
/// formatted timestamps and needs no format files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// JRE whose `lib/` holds the trace-format description files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jre_home: Option<PathBuf>,

    /// Default thread allow-list (decimal or `0x` hex ids)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub threads: Vec<String>,

    /// Default timezone offset, `+HH:MM` or `-HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default)]
    pub stack_scope: StackScope,
}

impl Config {
    pub fn path_in(workspace: &Path) -> PathBuf {
        workspace.join(CONFIG_FILE)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn thread_filter(&self) -> Result<ThreadFilter> {
        Ok(ThreadFilter::parse(&self.threads.join(","))?)
    }

    pub fn timezone_offset(&self) -> Result<TimezoneOffset> {
        match &self.timezone {
            Some(value) => Ok(TimezoneOffset::parse(value)?),
            None => Ok(TimezoneOffset::UTC),
        }
    }

    pub fn format_files(&self) -> Vec<FormatFile> {
        self.jre_home
            .as_deref()
            .map(format_files::default_for_jre)
            .unwrap_or_default()
    }

    /// Decoder options from the configured defaults.
    pub fn source_options(&self) -> Result<SourceOptions> {
        Ok(SourceOptions {
            threads: self.thread_filter()?,
            timezone: self.timezone_offset()?,
            format_files: self.format_files(),
        })
    }
}
