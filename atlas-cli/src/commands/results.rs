//! Measurement metadata and result commands.

use chrono::{TimeDelta, Utc};
use clap::Args;
use console::style;

use atlas_api::ResultWindow;
use atlas_core::config::AppConfig;
use atlas_core::error::{AtlasError, AtlasResult};

use crate::OutputFormat;

#[derive(Args)]
pub struct ResultsArgs {
    /// Measurement id.
    pub id: u64,
    /// Window start (unix seconds).
    #[arg(long, conflicts_with = "last_hours")]
    pub start: Option<i64>,
    /// Window end (unix seconds).
    #[arg(long)]
    pub stop: Option<i64>,
    /// Only results from the last N hours.
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    pub last_hours: Option<i64>,
}

impl ResultsArgs {
    fn window(&self) -> AtlasResult<ResultWindow> {
        let mut window = match self.last_hours {
            Some(hours) => ResultWindow::since(hours_ago(hours)?),
            None => ResultWindow::default(),
        };
        if let Some(start) = self.start {
            window.start = start;
        }
        if let Some(stop) = self.stop {
            window.stop = stop;
        }
        Ok(window)
    }
}

fn hours_ago(hours: i64) -> AtlasResult<chrono::DateTime<Utc>> {
    let out_of_range =
        || AtlasError::InvalidArgument(format!("--last-hours out of range: {hours}"));
    if hours < 1 {
        return Err(out_of_range());
    }
    let delta = TimeDelta::try_hours(hours).ok_or_else(out_of_range)?;
    Utc::now().checked_sub_signed(delta).ok_or_else(out_of_range)
}

pub async fn run_measurement(config: &AppConfig, id: u64, format: OutputFormat) -> AtlasResult<()> {
    let api = super::create_api_client(config)?;
    let meta = api.measurement(id).await?;

    match format {
        OutputFormat::Json => super::print_json(&meta),
        OutputFormat::Text => {
            println!("{}", style(format!("Measurement {id}")).bold().underlined());
            let field = |key: &str| {
                meta.get(key)
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .unwrap_or_else(|| "-".to_string())
            };
            println!("  Type:         {}", field("type"));
            println!("  Target:       {}", field("target"));
            println!("  Description:  {}", field("description"));
            println!(
                "  Status:       {}",
                meta.pointer("/status/name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("-")
            );
            println!("  Probes:       {}", field("participant_count"));
        }
    }
    Ok(())
}

pub async fn run_results(
    config: &AppConfig,
    args: ResultsArgs,
    format: OutputFormat,
) -> AtlasResult<()> {
    let api = super::create_api_client(config)?;
    let results = api.results(args.id, args.window()?).await?;

    match format {
        OutputFormat::Json => super::print_json(&results),
        OutputFormat::Text => {
            let count = results.as_array().map(|a| a.len()).unwrap_or(1);
            println!(
                "{} ({} result(s))",
                style(format!("Results for measurement {}", args.id)).bold().underlined(),
                count
            );
            super::print_json(&results);
        }
    }
    Ok(())
}
