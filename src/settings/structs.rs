//! The structs
//!
use std::path::PathBuf;

/// The settings for a single run.
///
/// The settings that can be set with a variable are resolved in this order:
/// 1. command line option,
/// 2. environment variable, which can come from a `.env` file,
/// 3. default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_source: PathBuf,
    pub report_destination: PathBuf,
    /// chrono strftime pattern for the report file name.
    pub timestamp_format: String,
    pub print_report: bool,
    pub wait_for_input: bool,
    pub print_diagnostics: bool,
    pub dump_records: bool,
}
