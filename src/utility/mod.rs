//! Module for the small utilities around a run.
mod utility;

pub use utility::*;
