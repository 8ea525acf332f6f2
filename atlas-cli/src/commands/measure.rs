//! One-off measurement commands.

use clap::Args;
use console::style;

use atlas_api::{AddressFamily, CreatedMeasurement, PingOptions, SslCertOptions};
use atlas_core::config::AppConfig;
use atlas_core::error::AtlasResult;

use crate::OutputFormat;

/// Arguments shared by every measurement type.
#[derive(Args)]
pub struct TargetArgs {
    /// Host name or IP address to measure.
    pub target: String,
    /// Probe ids that must run the measurement (comma separated).
    #[arg(short, long, required = true, value_delimiter = ',')]
    pub probes: Vec<u64>,
    /// Address family, 4 or 6.
    #[arg(long = "af", default_value = "4")]
    pub address_family: AddressFamily,
    /// Resolve the target once centrally instead of on each probe.
    #[arg(long)]
    pub no_resolve_on_probe: bool,
}

#[derive(Args)]
pub struct PingArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Packets per probe.
    #[arg(long, default_value = "4")]
    pub packets: u32,
    /// Milliseconds between packets.
    #[arg(long = "interval", default_value = "100")]
    pub packet_interval: u32,
}

#[derive(Args)]
pub struct SslCertArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn run_ping(config: &AppConfig, args: PingArgs, format: OutputFormat) -> AtlasResult<()> {
    let api = super::create_api_client(config)?;
    let opts = PingOptions {
        packets: args.packets,
        packet_interval: args.packet_interval,
        address_family: args.target.address_family,
        resolve_on_probe: !args.target.no_resolve_on_probe,
    };

    let created = api
        .ping(&args.target.target, &args.target.probes, &opts)
        .await?;
    print_created("ping", &args.target, &created, format)
}

pub async fn run_sslcert(
    config: &AppConfig,
    args: SslCertArgs,
    format: OutputFormat,
) -> AtlasResult<()> {
    let api = super::create_api_client(config)?;
    let opts = SslCertOptions {
        address_family: args.target.address_family,
        resolve_on_probe: !args.target.no_resolve_on_probe,
    };

    let created = api
        .sslcert(&args.target.target, &args.target.probes, &opts)
        .await?;
    print_created("sslcert", &args.target, &created, format)
}

fn print_created(
    kind: &str,
    target: &TargetArgs,
    created: &CreatedMeasurement,
    format: OutputFormat,
) -> AtlasResult<()> {
    match format {
        OutputFormat::Json => {
            super::print_json(&serde_json::json!({
                "type": kind,
                "target": target.target,
                "probes": target.probes,
                "measurement": created,
                "id": created.id(),
            }));
        }
        OutputFormat::Text => match created.id() {
            Some(id) => println!(
                "  {} {kind} of {} on {} probe(s): measurement {}",
                style("Created").green().bold(),
                target.target,
                target.probes.len(),
                style(id).bold()
            ),
            None => {
                println!("  {} {kind} of {}", style("Created").green().bold(), target.target);
                super::print_json(&serde_json::to_value(created)?);
            }
        },
    }
    Ok(())
}
