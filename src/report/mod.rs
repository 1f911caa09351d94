//! Module for aggregating parsed log lines into a per user activity report.
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
