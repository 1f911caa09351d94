//! The impls and functions.
//!
use std::{fmt::Write, fs, path::{Path, PathBuf}, time::Instant};
use chrono::{DateTime, Local};
use itertools::Itertools;
use colored::*;
use log::*;
use anyhow::{anyhow, Context, Result};
use crate::loglines::{AllLogLines, LogLine, LogLineParser};
use crate::report::{Report, UserActivity};
use crate::settings::Settings;

const REPORT_SUFFIX: &str = "_report.txt";
const RECORDS_SUFFIX: &str = "_records.json";
/// Characters that are not allowed in a file name on common filesystems.
/// Path separators and ':' are replaced by '-' before these are stripped.
const DISALLOWED_FILENAME_CHARACTERS: [char; 6] = ['<', '>', '"', '|', '?', '*'];

impl Report {
    /// Group the loglines per username and create the report.
    ///
    /// Loglines without a username (or with an empty one) do not show up in the report,
    /// but they do count for the newest timestamp.
    /// It's an error to create a report from no loglines at all.
    pub fn aggregate(
        loglines: &[LogLine],
    ) -> Result<Report>
    {
        info!("begin aggregate");
        let timer = Instant::now();

        let newest_timestamp = loglines.iter()
            .map(|logline| logline.timestamp)
            .max()
            .context("No log records to aggregate")?;
        let users = Report::group_by_username(loglines);
        let content = Report::render(&users, false);

        info!("end aggregate: {} users, {:?}", users.len(), timer.elapsed());
        Ok(Report { users, content, newest_timestamp })
    }
    /// The groups are in order of the first appearance of a username.
    fn group_by_username(
        loglines: &[LogLine],
    ) -> Vec<UserActivity>
    {
        let named_loglines = loglines.iter()
            .filter_map(|logline| match logline.username.as_deref() {
                Some(username) if !username.is_empty() => Some((username, logline)),
                _ => None,
            });
        let usernames: Vec<&str> = named_loglines.clone()
            .map(|(username, _)| username)
            .unique()
            .collect();
        let mut groups = named_loglines.into_group_map();

        usernames.into_iter()
            .filter_map(|username| {
                let group = groups.remove(username)?;
                let (first_activity, last_activity) = group.iter()
                    .map(|logline| logline.timestamp)
                    .minmax()
                    .into_option()?;
                let number_of_actions = group.len();
                // newest first; equal timestamps keep their order
                let activities = group.into_iter()
                    .cloned()
                    .sorted_by(|a, b| b.timestamp.cmp(&a.timestamp))
                    .collect();
                Some(UserActivity {
                    username: username.to_string(),
                    first_activity,
                    last_activity,
                    number_of_actions,
                    activities,
                })
            })
            .collect()
    }
    fn render(
        users: &[UserActivity],
        highlight: bool,
    ) -> String
    {
        let header = |username: &str| {
            if highlight {
                username.bold().to_string()
            } else {
                username.to_string()
            }
        };
        let mut content = String::new();

        content.push_str("Statistics:\n\n");
        for user in users {
            content.push_str(&format!("{}\n", header(&user.username)));
            content.push_str(&format!("First activity: {}\n", user.first_activity));
            content.push_str(&format!("Last activity: {}\n", user.last_activity));
            content.push_str(&format!("Number of actions: {}\n", user.number_of_actions));
            content.push('\n');
        }

        content.push_str("Activities:\n\n");
        for user in users {
            content.push_str(&format!("{}\n", header(&user.username)));
            for logline in &user.activities {
                content.push_str(&format!("{}, {}, {}, {}, {}\n",
                    logline.timestamp,
                    logline.log_level.as_deref().unwrap_or_default(),
                    logline.request_path.as_deref().unwrap_or_default(),
                    logline.referer.as_deref().unwrap_or_default(),
                    logline.message.as_deref().unwrap_or_default(),
                ));
            }
            content.push('\n');
        }
        content
    }
    pub fn filename(
        &self,
        timestamp_format: &str,
    ) -> Result<String>
    {
        report_filename(&self.newest_timestamp, timestamp_format)
    }
    /// Write the report into the destination directory, which is created if it doesn't exist.
    /// Returns the path of the report file.
    pub fn save(
        &self,
        destination: &Path,
        timestamp_format: &str,
    ) -> Result<PathBuf>
    {
        fs::create_dir_all(destination)
            .with_context(|| format!("Cannot create directory: {}", destination.display()))?;
        let filepath = destination.join(self.filename(timestamp_format)?);
        fs::write(&filepath, &self.content)
            .with_context(|| format!("Error saving report: {}", filepath.display()))?;
        info!("report saved: {}", filepath.display());
        Ok(filepath)
    }
    pub fn print(&self) {
        print!("{}", Report::render(&self.users, true));
    }
}

/// Format the timestamp, add the report suffix, and make the result usable as a file name.
/// An invalid timestamp format is an error.
pub fn report_filename(
    timestamp: &DateTime<Local>,
    timestamp_format: &str,
) -> Result<String>
{
    let mut formatted_timestamp = String::new();
    write!(formatted_timestamp, "{}", timestamp.format(timestamp_format))
        .map_err(|_| anyhow!("Invalid timestamp format: {}", timestamp_format))?;
    Ok(sanitize_filename(&format!("{}{}", formatted_timestamp, REPORT_SUFFIX)))
}

pub fn sanitize_filename(
    filename: &str,
) -> String
{
    filename.chars()
        .map(|character| match character {
            ':' | '/' | '\\' => '-',
            character => character,
        })
        .filter(|character| !character.is_control() && !DISALLOWED_FILENAME_CHARACTERS.contains(character))
        .collect::<String>()
        .trim()
        .to_string()
}

/// The json dump of the loglines sits next to the report, and shares its name.
pub fn records_filepath(
    report_filepath: &Path,
) -> PathBuf
{
    let report_filename = report_filepath.file_name()
        .map(|filename| filename.to_string_lossy().to_string())
        .unwrap_or_default();
    let records_filename = match report_filename.strip_suffix(REPORT_SUFFIX) {
        Some(stem) => format!("{}{}", stem, RECORDS_SUFFIX),
        None => format!("{}{}", report_filename, RECORDS_SUFFIX),
    };
    report_filepath.with_file_name(records_filename)
}

/// Read the log source directory, parse it, and write the report.
/// Returns the path of the report file.
pub fn create_report(
    settings: &Settings,
) -> Result<PathBuf>
{
    info!("begin create report");
    let timer = Instant::now();

    let parser = LogLineParser::new()?;
    let lines = AllLogLines::read_log_directory(&settings.log_source)?;
    let allloglines = AllLogLines::parse(&parser, &lines);
    allloglines.log_diagnostics();

    let report = Report::aggregate(&allloglines.loglines)
        .with_context(|| format!("No report created for log source: {}", settings.log_source.display()))?;
    let filepath = report.save(&settings.report_destination, &settings.timestamp_format)?;

    if settings.dump_records {
        allloglines.save_json(&records_filepath(&filepath))?;
    }
    if settings.print_report {
        report.print();
    }
    if settings.print_diagnostics {
        allloglines.print_diagnostics();
    }

    info!("end create report: {:?}", timer.elapsed());
    Ok(filepath)
}
