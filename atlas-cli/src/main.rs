//! Atlas CLI - command-line front end for the RIPE Atlas client.
//!
//! Loads configuration and credentials, sets up logging, builds a client,
//! and prints what the API returns. Useful for scripting probe selection
//! and firing off one-off measurements from a shell.

mod commands;

use clap::{Parser, Subcommand};
use tracing::debug;

use atlas_core::config::AppConfig;
use atlas_core::error::AtlasResult;
use atlas_core::logging;

/// RIPE Atlas client: find probes, run one-off measurements, fetch results.
#[derive(Parser)]
#[command(name = "atlas", version, about = "RIPE Atlas measurement client")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// API key (overrides config).
    #[arg(long, global = true, env = "ATLAS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Client name used in measurement descriptions (overrides config).
    #[arg(long, global = true, env = "ATLAS_CLIENT_NAME")]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for probes.
    Probes {
        #[command(subcommand)]
        action: commands::probes::ProbesAction,
    },
    /// Create a one-off ping measurement.
    Ping(commands::measure::PingArgs),
    /// Create a one-off TLS certificate check.
    Sslcert(commands::measure::SslCertArgs),
    /// Show a measurement's metadata.
    Measurement {
        /// Measurement id.
        id: u64,
    },
    /// Fetch a measurement's results.
    Results(commands::results::ResultsArgs),
    /// Inspect or create the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> AtlasResult<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.as_deref() {
        Some(path) => std::path::PathBuf::from(path),
        None => AppConfig::default_config_path()?,
    };
    let mut config = if config_path.exists() {
        AppConfig::load_from_file(&config_path)?
    } else {
        AppConfig::default()
    };
    if let Some(key) = cli.api_key {
        config.api.api_key = key;
    }
    if let Some(name) = cli.name {
        config.api.client_name = name;
    }

    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let _guard = match config.log_dir() {
        Some(dir) => Some(logging::init_logging(&log_level, &dir, config.logging.json_output)?),
        None => {
            logging::init_console_logging(&log_level);
            None
        }
    };

    debug!("atlas CLI v{}", atlas_core::constants::APP_VERSION);

    match cli.command {
        Commands::Probes { action } => commands::probes::run(&config, action, cli.format).await,
        Commands::Ping(args) => commands::measure::run_ping(&config, args, cli.format).await,
        Commands::Sslcert(args) => commands::measure::run_sslcert(&config, args, cli.format).await,
        Commands::Measurement { id } => {
            commands::results::run_measurement(&config, id, cli.format).await
        }
        Commands::Results(args) => commands::results::run_results(&config, args, cli.format).await,
        Commands::Config { action } => {
            commands::config::run(&config, &config_path, action, cli.format)
        }
    }
}
