//! The impls and functions.
//!
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use anyhow::{Context, Result};
use crate::fields::KeyPattern;

/// Timestamp layouts carrying their own offset.
const OFFSET_TIMESTAMP_FORMATS: [&str; 2] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];
/// Timestamp layouts without offset; these are taken as local time.
const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];
/// Date only layouts; these are taken as midnight local time.
const DATE_FORMATS: [&str; 2] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
];

impl KeyPattern {
    pub fn new(
        key: &str,
    ) -> Result<Self>
    {
        // (?:^|\s) keeps 'path=' from matching inside 'xpath='.
        let prefix = format!(r"(?:^|\s){}=", regex::escape(key));
        let compile = |value_pattern: &str| -> Result<Regex> {
            let pattern = format!("{}{}", prefix, value_pattern);
            Regex::new(&pattern)
                .with_context(|| format!("Invalid field pattern for key {}: {}", key, pattern))
        };

        Ok(KeyPattern {
            key: key.to_string(),
            value: compile(r#"(?:"([^"]*)"|(\S+))"#)?,
            integer: compile(r"(-?\d+)")?,
            token: compile(r"(\S+)")?,
            quoted: compile(r#""([^"]*)""#)?,
        })
    }
    /// A quoted span yields the text between the quotes, otherwise the run of non-space characters.
    pub fn string_value(
        &self,
        line: &str,
    ) -> Option<String>
    {
        let captures = self.value.captures(line)?;
        captures.get(1)
            .or_else(|| captures.get(2))
            .map(|value| value.as_str().to_string())
    }
    /// A value that doesn't fit into an i32 counts as not present.
    pub fn integer_value(
        &self,
        line: &str,
    ) -> Option<i32>
    {
        self.integer.captures(line)?
            .get(1)?
            .as_str()
            .parse::<i32>()
            .ok()
    }
    pub fn long_value(
        &self,
        line: &str,
    ) -> Option<i64>
    {
        self.integer.captures(line)?
            .get(1)?
            .as_str()
            .parse::<i64>()
            .ok()
    }
    pub fn timestamp_value(
        &self,
        line: &str,
    ) -> Option<DateTime<Local>>
    {
        let captures = self.token.captures(line)?;
        parse_timestamp(captures.get(1)?.as_str())
    }
    /// Only a quoted value is accepted; embedded quotes are not supported.
    pub fn quoted_value(
        &self,
        line: &str,
    ) -> Option<String>
    {
        self.quoted.captures(line)?
            .get(1)
            .map(|value| value.as_str().to_string())
    }
}

/// Parse a timestamp token into local time.
///
/// RFC 3339 is tried first, then ISO 8601 layouts with a numeric offset (`+0000`),
/// then layouts without any offset, which are interpreted in the local timezone,
/// and finally a date alone, which is midnight local time.
/// A local time that doesn't exist (DST gap) is not a valid timestamp.
pub fn parse_timestamp(
    token: &str,
) -> Option<DateTime<Local>>
{
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(token) {
        return Some(timestamp.with_timezone(&Local));
    }
    for format in OFFSET_TIMESTAMP_FORMATS {
        if let Ok(timestamp) = DateTime::parse_from_str(token, format) {
            return Some(timestamp.with_timezone(&Local));
        }
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(token, format) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(token, format) {
            return Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(hour, minute, second).unwrap();
        Local.from_local_datetime(&naive).unwrap()
    }

    #[test]
    fn unit_string_value_unquoted() {
        let pattern = KeyPattern::new("uname").unwrap();
        let line = "logger=context userId=1 orgId=1 uname=admin t=2024-01-01T10:00:00+0000";
        assert_eq!(pattern.string_value(line), Some("admin".to_string()));
    }

    #[test]
    fn unit_string_value_quoted_with_spaces() {
        let pattern = KeyPattern::new("referer").unwrap();
        let line = r#"uname=admin referer="http://grafana/d/abc?from=now 1h" size=10"#;
        assert_eq!(pattern.string_value(line), Some("http://grafana/d/abc?from=now 1h".to_string()));
    }

    #[test]
    fn unit_string_value_quoted_empty() {
        let pattern = KeyPattern::new("uname").unwrap();
        assert_eq!(pattern.string_value(r#"uname="" level=info"#), Some(String::new()));
    }

    #[test]
    fn unit_string_value_absent_or_malformed() {
        let pattern = KeyPattern::new("referer").unwrap();
        assert_eq!(pattern.string_value("uname=admin level=info"), None);
        // key without any value
        assert_eq!(pattern.string_value("uname=admin referer= size=10"), None);
    }

    #[test]
    fn unit_key_is_case_sensitive_and_literal() {
        let pattern = KeyPattern::new("path").unwrap();
        assert_eq!(pattern.string_value("uname=admin Path=/api"), None);
        assert_eq!(pattern.string_value("uname=admin xpath=/api"), None);
        assert_eq!(pattern.string_value("uname=admin xpath=/other path=/api"), Some("/api".to_string()));
    }

    #[test]
    fn unit_key_at_start_of_line() {
        let pattern = KeyPattern::new("method").unwrap();
        assert_eq!(pattern.string_value("method=GET uname=admin"), Some("GET".to_string()));
    }

    #[test]
    fn unit_integer_value() {
        let pattern = KeyPattern::new("status").unwrap();
        assert_eq!(pattern.integer_value("uname=admin status=200 size=10"), Some(200));
        assert_eq!(pattern.integer_value("uname=admin status=-1"), Some(-1));
        assert_eq!(pattern.integer_value("uname=admin status=abc"), None);
        assert_eq!(pattern.integer_value("uname=admin"), None);
    }

    #[test]
    fn unit_integer_value_overflow_is_absent() {
        let pattern = KeyPattern::new("size").unwrap();
        assert_eq!(pattern.integer_value("uname=admin size=99999999999"), None);
        assert_eq!(pattern.long_value("uname=admin size=99999999999"), Some(99_999_999_999));
    }

    #[test]
    fn unit_long_value() {
        let pattern = KeyPattern::new("time_ms").unwrap();
        assert_eq!(pattern.long_value("uname=admin time_ms=12"), Some(12));
        assert_eq!(pattern.long_value("uname=admin time_ms=fast"), None);
    }

    #[test]
    fn unit_timestamp_value_naive() {
        let pattern = KeyPattern::new("t").unwrap();
        let result = pattern.timestamp_value("uname=alice t=2024-01-01T00:00:00 level=info");
        assert_eq!(result, Some(local(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn unit_timestamp_value_with_offset() {
        let pattern = KeyPattern::new("t").unwrap();
        let naive = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let expected = Utc.from_utc_datetime(&naive).with_timezone(&Local);
        assert_eq!(pattern.timestamp_value("uname=admin t=2024-03-14T10:00:00+0000"), Some(expected));
        assert_eq!(pattern.timestamp_value("uname=admin t=2024-03-14T10:00:00Z"), Some(expected));
        assert_eq!(pattern.timestamp_value("uname=admin t=2024-03-14T11:00:00+01:00"), Some(expected));
    }

    #[test]
    fn unit_timestamp_value_fractional_seconds() {
        let pattern = KeyPattern::new("t").unwrap();
        let result = pattern.timestamp_value("t=2024-03-14T10:00:00.123456+0000 uname=admin").unwrap();
        assert_eq!(result.timestamp_subsec_micros(), 123456);
    }

    #[test]
    fn unit_timestamp_value_unparsable() {
        let pattern = KeyPattern::new("t").unwrap();
        assert_eq!(pattern.timestamp_value("uname=admin t=yesterday"), None);
        assert_eq!(pattern.timestamp_value("uname=admin level=info"), None);
    }

    #[test]
    fn unit_timestamp_key_does_not_match_inside_other_keys() {
        let pattern = KeyPattern::new("t").unwrap();
        assert_eq!(pattern.timestamp_value("uname=admin somet=2024-01-01T00:00:00"), None);
    }

    #[test]
    fn unit_quoted_value() {
        let pattern = KeyPattern::new("msg").unwrap();
        assert_eq!(pattern.quoted_value(r#"uname=admin msg="Request Completed" status=200"#), Some("Request Completed".to_string()));
        // a message is always quoted
        assert_eq!(pattern.quoted_value("uname=admin msg=completed"), None);
    }

    #[test]
    fn unit_timestamp_value_date_only() {
        let pattern = KeyPattern::new("t").unwrap();
        assert_eq!(pattern.timestamp_value("uname=admin t=2024-01-01 level=info"), Some(local(2024, 1, 1, 0, 0, 0)));
        assert_eq!(parse_timestamp("2024/02/29"), Some(local(2024, 2, 29, 0, 0, 0)));
        assert_eq!(parse_timestamp("2023-02-29"), None);
    }

    #[test]
    fn unit_parse_timestamp_space_separated() {
        assert_eq!(parse_timestamp("2024-01-01 12:30:00"), Some(local(2024, 1, 1, 12, 30, 0)));
        assert_eq!(parse_timestamp("2024/01/01 12:30:00"), Some(local(2024, 1, 1, 12, 30, 0)));
    }
}
