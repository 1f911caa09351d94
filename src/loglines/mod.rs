//! Module for reading and parsing key=value log lines.
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
