use mtrace_types::{COMPONENT_METHOD_TRACE, PointRow, PointType};

/// Indentation emitted per nesting level.
pub const INDENT_UNIT: &str = "    ";

/// Fold state for rendering a method trace as text.
///
/// With indentation on, an entry deepens the trace before its own line is
/// written and an exit shallows it after, so a call and its return line up.
#[derive(Debug, Clone, Default)]
pub struct TraceRenderer {
    indent: bool,
    depth: usize,
    out: String,
}

impl TraceRenderer {
    pub fn new(indent: bool) -> Self {
        Self {
            indent,
            ..Self::default()
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn step(mut self, row: PointRow) -> Self {
        if !row.is_component(COMPONENT_METHOD_TRACE) {
            return self;
        }

        if self.indent {
            if row.kind == PointType::Entry {
                self.depth += 1;
            }
            for _ in 0..self.depth {
                self.out.push_str(INDENT_UNIT);
            }
            if row.kind == PointType::Exit {
                self.depth = self.depth.saturating_sub(1);
            }
        }

        // Stored text as is: one output line per row
        self.out.push_str(signature_head(&row.formatted_parameters));
        self.out.push('\n');
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Formatted text up to the first space or comma.
pub fn signature_head(text: &str) -> &str {
    match text.find([' ', ',']) {
        Some(end) => &text[..end],
        None => text,
    }
}
