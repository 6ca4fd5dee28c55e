pub mod cancel;
pub mod domain;
pub mod error;
pub mod filter;
pub mod text;

pub use cancel::CancellationToken;
pub use domain::*;
pub use error::{Error, Result};
pub use filter::{ThreadFilter, TimezoneOffset};
pub use text::{desanitize, join_parameters, sanitize, split_parameters};

/// Component tag of method entry/exit trace points.
pub const COMPONENT_METHOD_TRACE: &str = "mt";

/// Component tag of auxiliary stack-trace text emitted after a trace point.
pub const COMPONENT_AUX_TRACE: &str = "j9trc_aux";
