//! Config command

use crate::app::OutputFormat;
use anyhow::Result;
use coursebot_core::{Config, CourseBotError};
use std::path::Path;

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let shown = config.redacted();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
        OutputFormat::Cli => {
            print!("{}", serde_yaml::to_string(&shown)?);
            println!("# store: {}", shown.store_path().display());
        }
    }
    Ok(())
}

/// Write the default configuration to `path`
pub fn init(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(CourseBotError::InvalidInput(format!(
            "config file {} already exists",
            path.display()
        ))
        .into());
    }
    Config::default().save_to(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
