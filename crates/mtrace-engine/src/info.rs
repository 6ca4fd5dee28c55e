use mtrace_types::desanitize;

/// Line written after every info entry.
pub const INFO_SEPARATOR: &str =
    "________________________________________________________________________________________________";

/// Render `(key, stored value)` pairs as a metadata dump.
///
/// Each entry is the upper-cased key, the desanitized value, the separator
/// line and a blank line.
pub fn format_session_info<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(&key.to_uppercase());
        out.push('\n');
        out.push_str(&desanitize(value));
        out.push('\n');
        out.push_str(INFO_SEPARATOR);
        out.push_str("\n\n");
    }
    out
}
