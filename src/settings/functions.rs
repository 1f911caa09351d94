//! The impls and functions.
//!
use std::{collections::HashMap, env, path::PathBuf};
use log::*;
use anyhow::{Context, Result};
use crate::settings::Settings;
use crate::Opts;

use crate::DEFAULT_LOG_SOURCE;
use crate::DEFAULT_REPORT_DESTINATION;
use crate::DEFAULT_TIMESTAMP_FORMAT;
use crate::DEFAULT_PRINT_REPORT;
use crate::DEFAULT_WAIT_FOR_INPUT;

pub const LOG_SOURCE_VARIABLE: &str = "ACTIVITY_REPORT_LOG_SOURCE";
pub const REPORT_DESTINATION_VARIABLE: &str = "ACTIVITY_REPORT_DESTINATION";
pub const TIMESTAMP_FORMAT_VARIABLE: &str = "ACTIVITY_REPORT_TIMESTAMP_FORMAT";
pub const PRINT_REPORT_VARIABLE: &str = "ACTIVITY_REPORT_PRINT_REPORT";
pub const WAIT_FOR_INPUT_VARIABLE: &str = "ACTIVITY_REPORT_WAIT_FOR_INPUT";

impl Settings {
    /// Resolve the settings.
    /// Every setting that is taken from an option or the environment is added to `changed_options`,
    /// so it can be written to the .env file.
    pub fn from_options(
        options: &Opts,
        changed_options: &mut HashMap<&'static str, String>,
    ) -> Result<Settings>
    {
        let log_source = set_setting(&options.log_source, LOG_SOURCE_VARIABLE, DEFAULT_LOG_SOURCE, changed_options);
        let report_destination = set_setting(&options.report_destination, REPORT_DESTINATION_VARIABLE, DEFAULT_REPORT_DESTINATION, changed_options);
        let timestamp_format = set_setting(&options.timestamp_format, TIMESTAMP_FORMAT_VARIABLE, DEFAULT_TIMESTAMP_FORMAT, changed_options);
        let print_report = set_flag(&options.print_report, PRINT_REPORT_VARIABLE, DEFAULT_PRINT_REPORT, changed_options)?;
        let wait_for_input = set_flag(&options.wait_for_input, WAIT_FOR_INPUT_VARIABLE, DEFAULT_WAIT_FOR_INPUT, changed_options)?;

        Ok(Settings {
            log_source: PathBuf::from(log_source),
            report_destination: PathBuf::from(report_destination),
            timestamp_format,
            print_report,
            wait_for_input,
            print_diagnostics: options.print_diagnostics,
            dump_records: options.dump_records,
        })
    }
}

pub fn set_setting(
    option: &Option<String>,
    variable: &'static str,
    default: &str,
    changed_options: &mut HashMap<&'static str, String>,
) -> String
{
    // is the option set?
    if let Some(value) = option {
        info!("{} argument set: using: {}", variable, value);
        changed_options.insert(variable, value.to_string());
        return value.to_string();
    }
    // is the environment variable set (via dotenv)?
    match env::var(variable) {
        Ok(set_var) => {
            info!("{} not set as argument: set via .env: {}", variable, set_var);
            changed_options.insert(variable, set_var.to_owned());
            set_var
        }
        Err(_e) => {
            info!("{} not set as argument and not set via .env: using default: {}", variable, default);
            default.to_string()
        }
    }
}

pub fn set_flag(
    option: &Option<bool>,
    variable: &'static str,
    default: bool,
    changed_options: &mut HashMap<&'static str, String>,
) -> Result<bool>
{
    if let Some(value) = option {
        info!("{} argument set: using: {}", variable, value);
        changed_options.insert(variable, value.to_string());
        return Ok(*value);
    }
    match env::var(variable) {
        Ok(set_var) => {
            let value: bool = set_var.trim().parse()
                .with_context(|| format!("Invalid value for {}: {} (expected true or false)", variable, set_var))?;
            info!("{} not set as argument: set via .env: {}", variable, value);
            changed_options.insert(variable, value.to_string());
            Ok(value)
        }
        Err(_e) => {
            info!("{} not set as argument and not set via .env: using default: {}", variable, default);
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn unit_set_setting_from_option() {
        let mut changed_options = HashMap::new();
        let result = set_setting(&Some("/var/log/grafana".to_string()), "ACTIVITY_REPORT_TEST_OPTION", "logs", &mut changed_options);
        assert_eq!(result, "/var/log/grafana");
        assert_eq!(changed_options.get("ACTIVITY_REPORT_TEST_OPTION").map(String::as_str), Some("/var/log/grafana"));
    }

    #[test]
    fn unit_set_setting_from_environment() {
        env::set_var("ACTIVITY_REPORT_TEST_ENVIRONMENT", "/srv/logs");
        let mut changed_options = HashMap::new();
        let result = set_setting(&None, "ACTIVITY_REPORT_TEST_ENVIRONMENT", "logs", &mut changed_options);
        assert_eq!(result, "/srv/logs");
        assert_eq!(changed_options.get("ACTIVITY_REPORT_TEST_ENVIRONMENT").map(String::as_str), Some("/srv/logs"));
    }

    #[test]
    fn unit_set_setting_default() {
        let mut changed_options = HashMap::new();
        let result = set_setting(&None, "ACTIVITY_REPORT_TEST_NEVER_SET", "logs", &mut changed_options);
        assert_eq!(result, "logs");
        assert!(changed_options.is_empty());
    }

    #[test]
    fn unit_set_flag() {
        let mut changed_options = HashMap::new();
        assert!(set_flag(&Some(true), "ACTIVITY_REPORT_TEST_FLAG_OPTION", false, &mut changed_options).unwrap());
        assert!(!set_flag(&None, "ACTIVITY_REPORT_TEST_FLAG_NEVER_SET", false, &mut changed_options).unwrap());

        env::set_var("ACTIVITY_REPORT_TEST_FLAG_ENVIRONMENT", "true");
        assert!(set_flag(&None, "ACTIVITY_REPORT_TEST_FLAG_ENVIRONMENT", false, &mut changed_options).unwrap());
        assert_eq!(changed_options.len(), 2);
    }

    #[test]
    fn unit_set_flag_invalid_environment() {
        env::set_var("ACTIVITY_REPORT_TEST_FLAG_INVALID", "yes please");
        let mut changed_options = HashMap::new();
        assert!(set_flag(&None, "ACTIVITY_REPORT_TEST_FLAG_INVALID", false, &mut changed_options).is_err());
    }

    #[test]
    fn unit_settings_from_options() {
        let options = Opts::parse_from([
            "activity_report",
            "--log-source", "input",
            "--report-destination", "output",
            "--timestamp-format", "%Y%m%d",
            "--print-report", "true",
            "--wait-for-input", "false",
            "--dump-records",
        ]);
        let mut changed_options = HashMap::new();

        let result = Settings::from_options(&options, &mut changed_options).unwrap();

        assert_eq!(result, Settings {
            log_source: PathBuf::from("input"),
            report_destination: PathBuf::from("output"),
            timestamp_format: "%Y%m%d".to_string(),
            print_report: true,
            wait_for_input: false,
            print_diagnostics: false,
            dump_records: true,
        });
        assert_eq!(changed_options.len(), 5);
    }
}
