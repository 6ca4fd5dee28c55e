// Engine module - turns stored trace points into invocations, rendered
// traces and statistics. Nothing here touches the session store directly:
// every entry point is a fold step over `PointRow` values or a pure
// function of rows the caller already fetched.

pub mod info;
pub mod reconstruct;
pub mod render;
pub mod stats;

pub use info::{INFO_SEPARATOR, format_session_info};
pub use reconstruct::{ReconstructState, StackScope};
pub use render::TraceRenderer;
pub use stats::{METHOD_NAME_COLUMN, StatsBuilder, StatsRow, StatsTable};

use mtrace_types::{MethodInvocation, PointRow};

/// Components a reconstruction scan must read.
pub const RECONSTRUCT_COMPONENTS: &[&str] = &[
    mtrace_types::COMPONENT_METHOD_TRACE,
    mtrace_types::COMPONENT_AUX_TRACE,
];

/// Components a trace rendering scan must read.
pub const RENDER_COMPONENTS: &[&str] = &[mtrace_types::COMPONENT_METHOD_TRACE];

/// Rebuild invocations from rows in stored order.
pub fn reconstruct<I>(rows: I, scope: StackScope) -> Vec<MethodInvocation>
where
    I: IntoIterator<Item = PointRow>,
{
    rows.into_iter()
        .fold(ReconstructState::new(scope), ReconstructState::step)
        .finish()
}

/// Render method-trace rows as one line per point.
pub fn render_trace<I>(rows: I, indent: bool) -> String
where
    I: IntoIterator<Item = PointRow>,
{
    rows.into_iter()
        .fold(TraceRenderer::new(indent), TraceRenderer::step)
        .finish()
}
