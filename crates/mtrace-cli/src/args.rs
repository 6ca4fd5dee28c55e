use clap::{Parser, Subcommand, ValueEnum};
use mtrace_engine::StackScope;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mtrace")]
#[command(
    about = "Import VM method traces into session stores and inspect reconstructed call stacks",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Workspace directory holding session stores (default: $MTRACE_WORKSPACE, then the data dir)
    #[arg(long, global = true)]
    pub workspace: Option<String>,

    /// Diagnostic verbosity on stderr; RUST_LOG overrides it
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode trace files and store them as a named session, replacing any session of that name
    Import {
        /// Session name; the store is written to <workspace>/<name>.fmt.db
        #[arg(long)]
        name: String,

        /// Comma separated thread ids to keep (decimal or 0x hex)
        #[arg(long)]
        threads: Option<String>,

        /// Pre-decoded trace files (JSON Lines)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List sessions in the workspace
    Sessions,

    /// Print the method trace of a session, one line per entry or exit
    Trace {
        name: String,

        /// Indent lines by call depth
        #[arg(long)]
        indent: bool,
    },

    /// List reconstructed method invocations of a session
    Calls {
        name: String,

        #[arg(long, default_value = "plain")]
        format: CallsFormat,

        /// Nesting scope (default: stack_scope from config.toml)
        #[arg(long)]
        scope: Option<ScopeArg>,
    },

    /// Compare method invocation counts across sessions
    Stats {
        #[arg(required = true)]
        names: Vec<String>,

        #[arg(long, default_value = "plain")]
        format: TableFormat,
    },

    /// Show the metadata recorded for a session
    Info { name: String },

    /// Run a read-only SQL query against a session store
    Sql { name: String, query: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Plain,
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CallsFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    PerThread,
    Global,
}

impl From<ScopeArg> for StackScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::PerThread => StackScope::PerThread,
            ScopeArg::Global => StackScope::Global,
        }
    }
}
