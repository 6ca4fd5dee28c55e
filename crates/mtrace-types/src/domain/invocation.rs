use serde::{Deserialize, Serialize};

/// A reconstructed method call: an entry point optionally paired with its exit.
///
/// Produced fresh by every reconstruction run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInvocation {
    pub class_name: String,
    pub method_name: String,
    pub parameters: String,
    /// Formatted entry text without its leading marker character
    pub definition: String,
    pub stack_level: usize,
    pub thread_id: i64,
    pub entry_tp_id: i64,
    pub exit_tp_id: Option<i64>,
    pub time_in: i64,
    pub time_out: Option<i64>,
    pub is_completed: bool,
    pub has_exception: bool,
    /// Auxiliary stack-trace lines in arrival order
    pub aux_trace: Vec<String>,
}

impl MethodInvocation {
    /// Record the matching exit.
    pub fn complete(&mut self, exit_tp_id: i64, time_out: i64, has_exception: bool) {
        self.exit_tp_id = Some(exit_tp_id);
        self.time_out = Some(time_out);
        self.is_completed = true;
        self.has_exception = has_exception;
    }

    /// Elapsed raw clock units between entry and exit.
    pub fn duration(&self) -> Option<i64> {
        self.time_out.map(|out| out - self.time_in)
    }

    /// `Class.method`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }
}
