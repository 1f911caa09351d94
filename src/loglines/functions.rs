//! The impls and functions.
//!
use std::{any::Any, fmt, fs, panic::{self, AssertUnwindSafe}, path::{Path, PathBuf}, time::Instant};
use log::*;
use colored::*;
use regex::Regex;
use anyhow::{bail, Context, Result};
use crate::fields::KeyPattern;
use crate::loglines::{AllLogLines, Diagnostic, Field, LogLine, LogLineParser};

/// The marker a line must carry to be of interest: `uname=` followed by a word character.
const USERNAME_MARKER: &str = r"uname=\w";

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Timestamp => "Timestamp",
            Field::UserId => "UserId",
            Field::OrgId => "OrgId",
            Field::Username => "Username",
            Field::LogLevel => "LogLevel",
            Field::Message => "Message",
            Field::RequestMethod => "RequestMethod",
            Field::RequestPath => "RequestPath",
            Field::Status => "Status",
            Field::RemoteAddress => "RemoteAddress",
            Field::Elapsed => "Elapsed",
            Field::Size => "Size",
            Field::Referer => "Referer",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FieldNotParsed(field) => write!(f, "Failed to parse {}.", field),
            Diagnostic::General(message) => write!(f, "General parsing error: {}", message),
        }
    }
}

impl LogLine {
    /// Pass the value through, and record a diagnostic for the field if it is missing.
    fn checked<T>(
        &mut self,
        field: Field,
        value: Option<T>,
    ) -> Option<T>
    {
        if value.is_none() {
            self.diagnostics.push(Diagnostic::FieldNotParsed(field));
        }
        value
    }
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
    /// The diagnostics as text, every diagnostic terminated by a newline.
    /// This is an empty string when all fields parsed.
    pub fn diagnostics_text(&self) -> String {
        self.diagnostics.iter()
            .map(|diagnostic| format!("{}\n", diagnostic))
            .collect()
    }
}

fn panic_message(
    payload: &(dyn Any + Send),
) -> String
{
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown error".to_string()
    }
}

impl LogLineParser {
    pub fn new() -> Result<Self> {
        Ok(LogLineParser {
            relevant: Regex::new(USERNAME_MARKER)
                .with_context(|| format!("Invalid username marker pattern: {}", USERNAME_MARKER))?,
            timestamp: KeyPattern::new("t")?,
            user_id: KeyPattern::new("userId")?,
            org_id: KeyPattern::new("orgId")?,
            username: KeyPattern::new("uname")?,
            log_level: KeyPattern::new("level")?,
            message: KeyPattern::new("msg")?,
            request_method: KeyPattern::new("method")?,
            request_path: KeyPattern::new("path")?,
            status: KeyPattern::new("status")?,
            remote_address: KeyPattern::new("remote_addr")?,
            elapsed: KeyPattern::new("time_ms")?,
            size: KeyPattern::new("size")?,
            referer: KeyPattern::new("referer")?,
        })
    }
    /// Does the line contain a username marker followed by a word character?
    pub fn is_relevant(
        &self,
        line: &str,
    ) -> bool
    {
        self.relevant.is_match(line)
    }
    /// Parse a single line into a [LogLine]. This always returns a [LogLine].
    pub fn parse_line(
        &self,
        line: &str,
    ) -> LogLine
    {
        LogLineParser::guarded(line, |line, logline| self.parse_fields(line, logline))
    }
    /// Run the field parsing for a line, and turn a panic during it into a diagnostic.
    /// Whatever was parsed before the panic is kept.
    fn guarded<F>(
        line: &str,
        parse_fields: F,
    ) -> LogLine
    where
        F: FnOnce(&str, &mut LogLine),
    {
        let mut logline = LogLine::default();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| parse_fields(line, &mut logline)));
        if let Err(payload) = outcome {
            let message = panic_message(&*payload);
            debug!("general parsing error: {}, line: {}", message, line);
            logline.diagnostics.push(Diagnostic::General(message));
        }
        logline
    }
    fn parse_fields(
        &self,
        line: &str,
        logline: &mut LogLine,
    )
    {
        logline.timestamp = logline.checked(Field::Timestamp, self.timestamp.timestamp_value(line)).unwrap_or_default();
        logline.user_id = logline.checked(Field::UserId, self.user_id.integer_value(line)).unwrap_or_default();
        logline.org_id = logline.checked(Field::OrgId, self.org_id.integer_value(line)).unwrap_or_default();
        logline.username = logline.checked(Field::Username, self.username.string_value(line));
        logline.log_level = logline.checked(Field::LogLevel, self.log_level.string_value(line));
        logline.message = logline.checked(Field::Message, self.message.quoted_value(line));
        logline.request_method = logline.checked(Field::RequestMethod, self.request_method.string_value(line));
        logline.request_path = logline.checked(Field::RequestPath, self.request_path.string_value(line));
        logline.status = logline.checked(Field::Status, self.status.integer_value(line));
        logline.remote_address = logline.checked(Field::RemoteAddress, self.remote_address.string_value(line));
        logline.elapsed = logline.checked(Field::Elapsed, self.elapsed.long_value(line));
        logline.size = logline.checked(Field::Size, self.size.integer_value(line));
        logline.referer = logline.checked(Field::Referer, self.referer.string_value(line));
    }
}

impl AllLogLines {
    pub fn new() -> Self { Default::default() }
    /// Filter the lines for a username marker, and parse every remaining line.
    /// The order of the lines is kept. This never fails: problems end up as diagnostics on the loglines.
    pub fn parse<S: AsRef<str>>(
        parser: &LogLineParser,
        lines: &[S],
    ) -> AllLogLines
    {
        info!("begin parse");
        let timer = Instant::now();

        let mut allloglines = AllLogLines::new();

        for line in lines.iter().map(|line| line.as_ref()).filter(|line| parser.is_relevant(line)) {
            allloglines.loglines.push(parser.parse_line(line));
        }

        info!("end parse: {} of {} lines parsed, {:?}", allloglines.loglines.len(), lines.len(), timer.elapsed());
        allloglines
    }
    /// Read all the files in the log source directory, in file name order, and return the lines.
    /// Subdirectories are skipped, invalid UTF-8 is replaced.
    pub fn read_log_directory(
        directory: &Path,
    ) -> Result<Vec<String>>
    {
        info!("begin read log directory: {}", directory.display());
        let timer = Instant::now();

        if !directory.is_dir() {
            bail!("Log source directory not found: {}", directory.display());
        }
        let mut files = fs::read_dir(directory)
            .with_context(|| format!("Error reading directory: {}", directory.display()))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<PathBuf>, _>>()
            .with_context(|| format!("Error reading directory entry: {}", directory.display()))?;
        files.retain(|path| path.is_file());
        files.sort();

        let mut lines: Vec<String> = Vec::new();
        for file in &files {
            let data = fs::read(file)
                .with_context(|| format!("Error reading file: {}", file.display()))?;
            let lines_before = lines.len();
            lines.extend(String::from_utf8_lossy(&data).lines().map(str::to_string));
            debug!("read {}: {} lines", file.display(), lines.len() - lines_before);
        }

        info!("end read log directory: {} files, {} lines, {:?}", files.len(), lines.len(), timer.elapsed());
        Ok(lines)
    }
    pub fn count_with_diagnostics(&self) -> usize {
        self.loglines.iter().filter(|logline| logline.has_diagnostics()).count()
    }
    /// Log the diagnostics: a summary as warning, the individual lines as debug.
    pub fn log_diagnostics(&self) {
        let with_diagnostics = self.count_with_diagnostics();
        if with_diagnostics > 0 {
            warn!("{} of {} log lines have fields that could not be parsed", with_diagnostics, self.loglines.len());
        }
        for logline in self.loglines.iter().filter(|logline| logline.has_diagnostics()) {
            debug!("{:?} {}: {}", logline.username, logline.timestamp, logline.diagnostics_text().trim_end().replace('\n', " "));
        }
    }
    pub fn print_diagnostics(&self) {
        for logline in self.loglines.iter().filter(|logline| logline.has_diagnostics()) {
            println!("{:33} {}", logline.timestamp, logline.username.as_deref().unwrap_or("").bold());
            for diagnostic in &logline.diagnostics {
                match diagnostic {
                    Diagnostic::FieldNotParsed(_) => println!("  {}", diagnostic.to_string().yellow()),
                    Diagnostic::General(_) => println!("  {}", diagnostic.to_string().red()),
                }
            }
        }
    }
    /// Write the loglines as json.
    pub fn save_json(
        &self,
        filepath: &Path,
    ) -> Result<()>
    {
        fs::write(filepath, serde_json::to_string(&self.loglines)
            .with_context(|| "Json serialization error")?
        ).with_context(|| format!("Error saving loglines: {}", filepath.display()))?;
        info!("loglines saved: {}", filepath.display());
        Ok(())
    }
}
