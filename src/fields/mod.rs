//! Module for extracting typed `key=value` fields from a single log line.
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
