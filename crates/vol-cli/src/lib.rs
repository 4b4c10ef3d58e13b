//! Library components of the `volontaires` command-line tool.

pub mod logging;
pub mod render;
pub mod slots;
