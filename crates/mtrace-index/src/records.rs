/// One row of the `info` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub key: String,
    /// Value as stored (sanitized)
    pub value: String,
}

/// Counts reported after a session store was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub threads: usize,
    pub points: usize,
}

/// Text rendition of an ad-hoc query result.
///
/// The first column is always `Sl. No.`, the 1-based row number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
