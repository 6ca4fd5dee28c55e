//! TestWorld pattern for CLI integration tests.

use anyhow::Result;
use assert_cmd::Command;
use mtrace_types::DecodedTrace;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated environment: a workspace directory for session stores and an
/// input directory for trace files.
///
/// # Example
/// ```no_run
/// use assert_cmd::Command;
/// use mtrace_testing::{TestWorld, sample_trace};
///
/// let world = TestWorld::new();
/// let input = world.write_trace("run.jsonl", &sample_trace()).unwrap();
///
/// let mut cmd = Command::cargo_bin("mtrace").unwrap();
/// world.configure_command(&mut cmd);
/// cmd.args(["import", "--name", "run"]).arg(&input).assert().success();
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    workspace: PathBuf,
    inputs: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = temp_dir.path().join("workspace");
        let inputs = temp_dir.path().join("inputs");

        std::fs::create_dir_all(&workspace).expect("Failed to create workspace dir");
        std::fs::create_dir_all(&inputs).expect("Failed to create inputs dir");

        Self {
            temp_dir,
            workspace,
            inputs,
            env_vars: HashMap::new(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn inputs(&self) -> &Path {
        &self.inputs
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write a decoded trace as a JSONL input file.
    pub fn write_trace(&self, file_name: &str, trace: &DecodedTrace) -> Result<PathBuf> {
        let path = self.inputs.join(file_name);
        std::fs::write(&path, mtrace_source::to_jsonl(trace)?)?;
        Ok(path)
    }

    /// Write arbitrary bytes into the input directory.
    pub fn write_input(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.inputs.join(file_name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write arbitrary bytes into the workspace, e.g. a bogus store.
    pub fn write_workspace_file(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.workspace.join(file_name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn store_path(&self, session: &str) -> PathBuf {
        self.workspace.join(format!("{}.fmt.db", session))
    }

    /// Point a CLI command at this world.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--workspace").arg(&self.workspace);
        cmd.current_dir(self.temp_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("MTRACE_WORKSPACE");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }
}
