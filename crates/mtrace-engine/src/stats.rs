use mtrace_types::desanitize;
use serde::Serialize;

/// Header of the leading method column.
pub const METHOD_NAME_COLUMN: &str = "Method Name";

/// Per-method invocation counts, one count column per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsTable {
    /// Session names in column order
    pub sessions: Vec<String>,
    /// Methods in order of first sight across sessions
    pub rows: Vec<StatsRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsRow {
    pub method: String,
    /// One count per session, zero where the session never entered the method
    pub counts: Vec<u64>,
}

impl StatsTable {
    /// Column headers: the method column followed by one per session.
    pub fn columns(&self) -> Vec<String> {
        std::iter::once(METHOD_NAME_COLUMN.to_string())
            .chain(
                self.sessions
                    .iter()
                    .map(|name| format!("{} (Invocations count)", name)),
            )
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds a [`StatsTable`] one session at a time.
#[derive(Debug, Default)]
pub struct StatsBuilder {
    table: StatsTable,
}

impl StatsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column from `(stored parameters, entry count)` pairs.
    pub fn add_session<I>(mut self, name: &str, counts: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let column = self.table.sessions.len();
        self.table.sessions.push(name.to_string());
        for row in &mut self.table.rows {
            row.counts.push(0);
        }

        for (parameters, count) in counts {
            let method = desanitize(&parameters);
            let index = match self.table.rows.iter().position(|r| r.method == method) {
                Some(index) => index,
                None => {
                    self.table.rows.push(StatsRow {
                        method,
                        counts: vec![0; column + 1],
                    });
                    self.table.rows.len() - 1
                }
            };
            self.table.rows[index].counts[column] += count;
        }
        self
    }

    pub fn finish(self) -> StatsTable {
        self.table
    }
}
