//! The structs
//!
use chrono::{DateTime, Local};
use regex::Regex;
use crate::fields::KeyPattern;

/// The root struct for a parsed key=value log line.
///
/// Every field is parsed independently and best effort. A field that could not be found or parsed is
/// recorded in `diagnostics`, the line itself is never rejected.
///
/// ```text
/// logger=context userId=1 orgId=1 uname=admin t=2024-03-14T10:00:00.123+0000 level=info msg="Request Completed" method=GET path=/api/search status=200 remote_addr=10.0.0.1 time_ms=12 size=1024 referer=http://grafana/
/// ```
///
/// `timestamp`, `user_id` and `org_id` are always set, and carry the default (zero) value when parsing failed.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub user_id: i32,
    pub org_id: i32,
    pub username: Option<String>,
    pub log_level: Option<String>,
    pub message: Option<String>,
    pub request_method: Option<String>,
    pub request_path: Option<String>,
    pub status: Option<i32>,
    pub remote_address: Option<String>,
    /// milliseconds
    pub elapsed: Option<i64>,
    pub size: Option<i32>,
    pub referer: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}
/// The fields of a [LogLine] that are extracted from the line.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Timestamp,
    UserId,
    OrgId,
    Username,
    LogLevel,
    Message,
    RequestMethod,
    RequestPath,
    Status,
    RemoteAddress,
    Elapsed,
    Size,
    Referer,
}
/// A single parse problem for a [LogLine].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The field was not present, or its value could not be parsed.
    FieldNotParsed(Field),
    /// Parsing of the line stopped unexpectedly.
    General(String),
}
/// Wrapper struct for holding the parsed loglines.
#[derive(Debug, Default)]
pub struct AllLogLines {
    pub loglines: Vec<LogLine>,
}
/// The compiled field patterns, one per key in a log line,
/// and the pattern that decides if a line is parsed at all.
#[derive(Debug, Clone)]
pub struct LogLineParser {
    /// `uname=` followed by a word character.
    pub relevant: Regex,
    pub timestamp: KeyPattern,
    pub user_id: KeyPattern,
    pub org_id: KeyPattern,
    pub username: KeyPattern,
    pub log_level: KeyPattern,
    pub message: KeyPattern,
    pub request_method: KeyPattern,
    pub request_path: KeyPattern,
    pub status: KeyPattern,
    pub remote_address: KeyPattern,
    pub elapsed: KeyPattern,
    pub size: KeyPattern,
    pub referer: KeyPattern,
}
