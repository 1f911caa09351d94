//! The structs
//!
use chrono::{DateTime, Local};
use crate::loglines::LogLine;

/// The activity of a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserActivity {
    pub username: String,
    pub first_activity: DateTime<Local>,
    pub last_activity: DateTime<Local>,
    pub number_of_actions: usize,
    /// newest first
    pub activities: Vec<LogLine>,
}
/// The report created from all parsed log lines.
///
/// `content` is the rendered text report, `newest_timestamp` the newest timestamp of all log lines,
/// including the ones without a username. The latter is used to name the report file.
#[derive(Debug, Clone)]
pub struct Report {
    pub users: Vec<UserActivity>,
    pub content: String,
    pub newest_timestamp: DateTime<Local>,
}
