pub mod info;
pub mod point;
pub mod raw;
pub mod thread;
