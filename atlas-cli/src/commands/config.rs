//! Configuration file commands.

use std::path::Path;

use clap::Subcommand;
use console::style;

use atlas_core::config::AppConfig;
use atlas_core::error::{AtlasError, AtlasResult};

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (API key masked).
    Show,
    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub fn run(
    config: &AppConfig,
    path: &Path,
    action: ConfigAction,
    format: OutputFormat,
) -> AtlasResult<()> {
    match action {
        ConfigAction::Show => {
            let mut shown = config.clone();
            shown.api.api_key = super::mask_secret(&shown.api.api_key);

            match format {
                OutputFormat::Json => {
                    let mut value = serde_json::to_value(&shown)?;
                    value["path"] = serde_json::Value::String(path.display().to_string());
                    super::print_json(&value);
                }
                OutputFormat::Text => {
                    println!("{}", style("Configuration").bold().underlined());
                    println!("  File:         {}", path.display());
                    println!("  API root:     {}", shown.api.base_url);
                    println!("  Client name:  {}", or_unset(&shown.api.client_name));
                    println!("  API key:      {}", shown.api.api_key);
                    println!("  Timeout:      {} ms", shown.api.timeout_ms);
                    println!("  Log level:    {}", shown.logging.level);
                    println!(
                        "  Log dir:      {}",
                        or_unset(&shown.logging.directory)
                    );
                }
            }
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(AtlasError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            AppConfig::default().save_to_file(path)?;
            println!("  {} {}", style("Wrote").green().bold(), path.display());
        }
    }
    Ok(())
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}
