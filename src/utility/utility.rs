//! Utilities
use log::*;
use std::{collections::HashMap, fs, io::{stdin, stdout, Write}, path::Path};
use itertools::Itertools;
use anyhow::{Context, Result};

/// Write the settings that were taken from options or the environment to the dotenv file,
/// so a next run uses them without specifying them again.
/// The file is truncated and overwritten.
pub fn dotenv_writer(
    write_dotenv: bool,
    changed_options: HashMap<&str, String>,
    dotenv_file: &Path,
) -> Result<()>
{
    if !changed_options.is_empty() && write_dotenv {
        info!("Writing dotenv file: {}", dotenv_file.display());
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(dotenv_file)
            .with_context(|| format!("Error writing dotenv file: {}", dotenv_file.display()))?;

        for (key, value) in changed_options.iter().sorted() {
            file.write_all(format!("{}={}\n", key, value).as_bytes())
                .with_context(|| format!("Error writing dotenv file: {}", dotenv_file.display()))?;
            info!("{}={}", key, value);
        }
    }
    Ok(())
}

pub fn wait_for_input() -> Result<()> {
    print!("Press enter to exit...");
    stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)
        .with_context(|| "Error reading from stdin")?;
    Ok(())
}
