mod invocation;
mod point;
mod trace;

pub use invocation::*;
pub use point::*;
pub use trace::*;
