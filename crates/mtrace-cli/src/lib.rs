mod args;
mod commands;
mod handlers;
mod logging;
mod output;

pub use args::{CallsFormat, Cli, Commands, LogLevel, ScopeArg, TableFormat};
pub use commands::run;
