//! Module for resolving the run settings from options, environment (.env) and defaults.
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
