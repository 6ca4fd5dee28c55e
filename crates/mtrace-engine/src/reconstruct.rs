use mtrace_types::{
    COMPONENT_AUX_TRACE, COMPONENT_METHOD_TRACE, MethodInvocation, PointRow, PointType,
    desanitize, split_parameters,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Marker leading the formatted text of an exit left by an exception.
pub const EXCEPTION_MARKER: char = '*';

/// How nesting depth is tracked across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackScope {
    /// One depth counter per thread; exits only match entries of their own thread
    #[default]
    PerThread,
    /// A single depth counter shared by every thread
    Global,
}

impl StackScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackScope::PerThread => "per-thread",
            StackScope::Global => "global",
        }
    }
}

impl fmt::Display for StackScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StackScope {
    type Err = mtrace_types::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-thread" | "thread" => Ok(StackScope::PerThread),
            "global" => Ok(StackScope::Global),
            other => Err(mtrace_types::Error::Parse(format!(
                "unknown stack scope '{}' (expected per-thread or global)",
                other
            ))),
        }
    }
}

/// Identity an exit must share with the entry it closes.
#[derive(Debug, PartialEq, Eq)]
struct CallKey<'a> {
    class_name: &'a str,
    method_name: &'a str,
    parameters: &'a str,
    stack_level: usize,
    thread_id: Option<i64>,
}

/// Explicit state of a reconstruction scan.
///
/// Each [`step`](Self::step) consumes the state and one row and returns the
/// next state, so a scan is a plain fold over rows in stored order.
#[derive(Debug, Clone)]
pub struct ReconstructState {
    scope: StackScope,
    depths: HashMap<i64, usize>,
    invocations: Vec<MethodInvocation>,
    dropped_exits: u64,
}

impl ReconstructState {
    pub fn new(scope: StackScope) -> Self {
        Self {
            scope,
            depths: HashMap::new(),
            invocations: Vec::new(),
            dropped_exits: 0,
        }
    }

    pub fn scope(&self) -> StackScope {
        self.scope
    }

    /// Invocations built so far, in entry order.
    pub fn invocations(&self) -> &[MethodInvocation] {
        &self.invocations
    }

    /// Exits that matched no open entry.
    pub fn dropped_exits(&self) -> u64 {
        self.dropped_exits
    }

    pub fn step(mut self, row: PointRow) -> Self {
        if row.is_component(COMPONENT_AUX_TRACE) {
            // Not scoped by thread: aux text follows whatever was entered last
            if let Some(last) = self.invocations.last_mut() {
                last.aux_trace.push(desanitize(&row.formatted_parameters));
            }
            return self;
        }

        if !row.is_component(COMPONENT_METHOD_TRACE) {
            return self;
        }

        let parameters = split_parameters(&row.parameters);
        if parameters.len() < 3 {
            return self;
        }

        match row.kind {
            PointType::Entry => self.enter(row, parameters),
            PointType::Exit => self.exit(row, parameters),
            PointType::Event => {}
        }
        self
    }

    pub fn finish(self) -> Vec<MethodInvocation> {
        let open = self.invocations.iter().filter(|i| !i.is_completed).count();
        debug!(
            invocations = self.invocations.len(),
            open,
            dropped_exits = self.dropped_exits,
            "reconstruction finished"
        );
        self.invocations
    }

    fn depth_key(&self, thread_id: i64) -> i64 {
        match self.scope {
            StackScope::PerThread => thread_id,
            StackScope::Global => 0,
        }
    }

    fn enter(&mut self, row: PointRow, mut parameters: Vec<String>) {
        let key = self.depth_key(row.thread_id);
        let depth = self.depths.entry(key).or_insert(0);
        let stack_level = *depth;
        *depth += 1;

        parameters.truncate(3);
        let parameter_text = parameters.pop().unwrap_or_default();
        let method_name = parameters.pop().unwrap_or_default();
        let class_name = parameters.pop().unwrap_or_default();

        self.invocations.push(MethodInvocation {
            class_name,
            method_name,
            parameters: parameter_text,
            definition: strip_marker(&desanitize(&row.formatted_parameters)).to_string(),
            stack_level,
            thread_id: row.thread_id,
            entry_tp_id: row.tp_id,
            exit_tp_id: None,
            time_in: row.raw_time,
            time_out: None,
            is_completed: false,
            has_exception: false,
            aux_trace: Vec::new(),
        });
    }

    fn exit(&mut self, row: PointRow, parameters: Vec<String>) {
        let key = self.depth_key(row.thread_id);
        let depth = self.depths.entry(key).or_insert(0);
        if *depth == 0 {
            debug!(tp_id = row.tp_id, thread_id = row.thread_id, "exit below stack bottom dropped");
            self.dropped_exits += 1;
            return;
        }
        *depth -= 1;

        let wanted = CallKey {
            class_name: &parameters[0],
            method_name: &parameters[1],
            parameters: &parameters[2],
            stack_level: *depth,
            thread_id: match self.scope {
                StackScope::PerThread => Some(row.thread_id),
                StackScope::Global => None,
            },
        };
        let scope = self.scope;

        let found = self
            .invocations
            .iter_mut()
            .rev()
            .find(|inv| !inv.is_completed && call_key(inv, scope) == wanted);

        match found {
            Some(invocation) => invocation.complete(
                row.tp_id,
                row.raw_time,
                row.formatted_parameters.starts_with(EXCEPTION_MARKER),
            ),
            None => {
                debug!(tp_id = row.tp_id, thread_id = row.thread_id, "unmatched exit dropped");
                self.dropped_exits += 1;
            }
        }
    }
}

fn call_key(invocation: &MethodInvocation, scope: StackScope) -> CallKey<'_> {
    CallKey {
        class_name: &invocation.class_name,
        method_name: &invocation.method_name,
        parameters: &invocation.parameters,
        stack_level: invocation.stack_level,
        thread_id: match scope {
            StackScope::PerThread => Some(invocation.thread_id),
            StackScope::Global => None,
        },
    }
}

/// Drop the leading entry/exit marker character.
fn strip_marker(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.as_str()
}
