//! Read key=value formatted log files, parse the known fields best effort,
//! and write a report of the activity per user.
#[macro_use]
extern crate serde_derive;

use clap::Parser;

pub mod fields;
pub mod loglines;
pub mod report;
pub mod settings;
pub mod utility;

const DEFAULT_LOG_SOURCE: &str = "logs";
const DEFAULT_REPORT_DESTINATION: &str = "reports";
const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const DEFAULT_PRINT_REPORT: bool = false;
const DEFAULT_WAIT_FOR_INPUT: bool = false;

/// The command line options.
///
/// Options that are not set are taken from the environment, which is read from `.env` (or `--env-file`),
/// and otherwise use the default.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Opts {
    /// directory with the log files to read
    #[arg(long, value_name = "directory")]
    pub log_source: Option<String>,
    /// directory to write the report to
    #[arg(long, value_name = "directory")]
    pub report_destination: Option<String>,
    /// strftime pattern for the timestamp in the report file name
    #[arg(long, value_name = "pattern")]
    pub timestamp_format: Option<String>,
    /// print the report after writing it
    #[arg(long, value_name = "true|false")]
    pub print_report: Option<bool>,
    /// wait for enter before exiting
    #[arg(long, value_name = "true|false")]
    pub wait_for_input: Option<bool>,
    /// print the log lines with fields that could not be parsed
    #[arg(long)]
    pub print_diagnostics: bool,
    /// write the parsed log lines as json next to the report
    #[arg(long)]
    pub dump_records: bool,
    /// read the settings from this file instead of .env
    #[arg(long, value_name = "file")]
    pub env_file: Option<String>,
    /// write the used settings to the .env file (or --env-file)
    #[arg(long)]
    pub write_dotenv: bool,
}
