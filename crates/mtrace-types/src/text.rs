//! Text encoding for free-form trace text stored in session files.
//!
//! Stored text never contains a literal newline, quote character, or a run
//! of whitespace. Newlines survive as a two-character `\n` marker and are
//! restored on read; collapsed whitespace and quotes are gone for good.

use regex::Regex;
use std::sync::LazyLock;

/// Escaped form of a newline inside stored text.
pub const NEWLINE_MARKER: &str = "\\n";

/// Separator between raw parameter values in the `parameters` column.
pub const PARAMETER_DELIMITER: &str = "||";

/// Maximum number of raw parameter values persisted per point.
pub const MAX_STORED_PARAMETERS: usize = 3;

static QUOTES_AND_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"\s]+"#).expect("static pattern"));

/// Encode free text for storage.
pub fn sanitize(text: &str) -> String {
    let escaped = text.replace('\n', NEWLINE_MARKER);
    QUOTES_AND_WHITESPACE
        .replace_all(&escaped, " ")
        .trim()
        .to_string()
}

/// Restore newlines in stored text for display.
///
/// Any backslash-`n` pair becomes a newline, including one that was already
/// in the source text (Windows paths, escaped string literals).
pub fn desanitize(text: &str) -> String {
    text.replace(NEWLINE_MARKER, "\n")
}

/// Build the stored `parameters` column from raw values.
pub fn join_parameters<S: AsRef<str>>(values: &[S]) -> String {
    let joined = values
        .iter()
        .take(MAX_STORED_PARAMETERS)
        .map(|v| sanitize(v.as_ref()))
        .collect::<Vec<_>>()
        .join(PARAMETER_DELIMITER);
    sanitize(&joined)
}

/// Split a stored `parameters` column back into its values.
///
/// Trailing empty values are dropped, so `"A||foo||"` yields two values.
pub fn split_parameters(stored: &str) -> Vec<String> {
    let mut values: Vec<String> = desanitize(stored)
        .split(PARAMETER_DELIMITER)
        .map(str::to_string)
        .collect();
    while values.last().is_some_and(|v| v.is_empty()) {
        values.pop();
    }
    values
}
