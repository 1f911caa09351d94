use std::{collections::HashMap, path::PathBuf, process};
use clap::Parser;
use dotenv::dotenv;
use log::*;
use anyhow::{Context, Result};
use activity_report::{report, utility, Opts};
use activity_report::settings::Settings;

const DEFAULT_DOTENV_FILE: &str = ".env";

fn main() -> Result<()>
{
    env_logger::init();
    let options = Opts::parse();

    // the env file given as option must exist, the default .env is optional.
    let dotenv_file = match &options.env_file {
        Some(env_file) => {
            dotenv::from_path(env_file)
                .with_context(|| format!("Error reading env file: {}", env_file))?;
            PathBuf::from(env_file)
        },
        None => {
            dotenv().ok();
            PathBuf::from(DEFAULT_DOTENV_FILE)
        },
    };

    let mut changed_options = HashMap::new();
    let settings = Settings::from_options(&options, &mut changed_options)?;
    debug!("{:?}", settings);
    utility::dotenv_writer(options.write_dotenv, changed_options, &dotenv_file)?;

    let result = report::create_report(&settings);
    match &result {
        Ok(filepath) => println!("Report saved: {}", filepath.display()),
        Err(error) => eprintln!("Error: {:?}", error),
    }

    if settings.wait_for_input {
        utility::wait_for_input()?;
    }
    if result.is_err() {
        process::exit(1);
    }
    Ok(())
}
