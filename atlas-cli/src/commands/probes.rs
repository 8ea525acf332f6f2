//! Probe search commands.

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use futures::{StreamExt, TryStreamExt};

use atlas_api::{Probe, ProbeFilters, ProbeStream};
use atlas_core::config::AppConfig;
use atlas_core::error::AtlasResult;

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ProbesAction {
    /// Look up probes by id.
    Ids {
        /// Probe ids (space or comma separated).
        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<u64>,
    },
    /// Probes within a radius of a location.
    Geo {
        /// Latitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Radius in kilometres.
        #[arg(long)]
        radius: f64,
        /// Extra filter as key=value (repeatable), e.g. asn_v4=3333.
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Stop after this many probes.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Probes in a country.
    Country {
        /// ISO 3166-1 alpha-2 country code.
        code: String,
        /// Extra filter as key=value (repeatable), e.g. status=connected.
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Stop after this many probes.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

pub async fn run(
    config: &AppConfig,
    action: ProbesAction,
    format: OutputFormat,
) -> AtlasResult<()> {
    let api = super::create_api_client(config)?;

    let (stream, limit): (ProbeStream, Option<usize>) = match action {
        ProbesAction::Ids { ids } => (api.probes_by_id(&ids), None),
        ProbesAction::Geo {
            lat,
            lon,
            radius,
            filters,
            limit,
        } => {
            let filters = parse_filters(&filters)?;
            (api.probes_by_geo(lat, lon, radius, &filters), limit)
        }
        ProbesAction::Country {
            code,
            filters,
            limit,
        } => {
            let filters = parse_filters(&filters)?;
            (api.probes_by_country(&code, &filters), limit)
        }
    };

    let probes: Vec<Probe> = match limit {
        Some(n) => stream.take(n).try_collect().await?,
        None => stream.try_collect().await?,
    };

    match format {
        OutputFormat::Json => {
            let value = serde_json::to_value(&probes)?;
            super::print_json(&value);
        }
        OutputFormat::Text => print_table(&probes),
    }
    Ok(())
}

fn parse_filters(raw: &[String]) -> AtlasResult<ProbeFilters> {
    let pairs = raw
        .iter()
        .map(|pair| ProbeFilters::parse_pair(pair))
        .collect::<AtlasResult<Vec<_>>>()?;
    ProbeFilters::from_pairs(pairs)
}

fn print_table(probes: &[Probe]) {
    if probes.is_empty() {
        println!("  {}", style("No probes matched.").dim());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Country", "ASN v4", "ASN v6", "Status", "Anchor", "Description"]);

    for probe in probes {
        table.add_row(vec![
            probe.id.to_string(),
            probe.country_code().unwrap_or("-").to_string(),
            probe.asn_v4().map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
            probe.asn_v6().map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
            probe.status_name().unwrap_or("-").to_string(),
            if probe.is_anchor() { "yes" } else { "" }.to_string(),
            super::truncate(probe.description().unwrap_or(""), 40),
        ]);
    }

    println!("{table}");
    println!("  {} probe(s)", style(probes.len()).bold());
}
