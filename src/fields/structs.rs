//! The structs
//!
use regex::Regex;

/// The compiled patterns for a single field key.
///
/// A key is matched literally, case-sensitive, and must start the line or follow whitespace.
/// The value that follows `key=` can take several shapes, and each shape has its own pattern:
///
/// ```text
/// uname=admin                 value:   unquoted run of non-space characters
/// referer="http://grafana/"   value:   quoted span, without embedded quotes
/// status=-1                   integer: optional minus and digits
/// t=2024-01-01T10:00:00+0000  token:   non-space run, parsed as timestamp afterwards
/// msg="Request Completed"     quoted:  quoted span only
/// ```
#[derive(Debug, Clone)]
pub struct KeyPattern {
    pub key: String,
    pub value: Regex,
    pub integer: Regex,
    pub token: Regex,
    pub quoted: Regex,
}
