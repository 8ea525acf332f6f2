//! Atlas API - HTTP client for the RIPE Atlas REST API.
//!
//! Covers probe search (by id, by location, by country), one-off ping and
//! TLS certificate measurements, and measurement metadata and results.
//! Listings are lazy streams that fetch pages on demand; every request is
//! issued sequentially and failures are returned without retries.
//!
//! ```no_run
//! use atlas_api::{AtlasClient, PingOptions, ProbeFilters};
//! use atlas_core::ApiConfig;
//! use futures::TryStreamExt;
//!
//! # async fn example() -> atlas_core::AtlasResult<()> {
//! let client = AtlasClient::new(&ApiConfig::new("my-monitor", "api-key"))?;
//!
//! let probes: Vec<_> = client
//!     .probes_by_country("NL", &ProbeFilters::new().is_public(true))
//!     .try_collect()
//!     .await?;
//! let ids: Vec<u64> = probes.iter().take(5).map(|p| p.id).collect();
//!
//! let created = client.ping("example.com", &ids, &PingOptions::default()).await?;
//! println!("created measurement {:?}", created.id());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoints;
pub mod filters;
pub mod paginate;
pub mod response;

// Re-export key types
pub use client::{AtlasClient, QueryParams};
pub use endpoints::measurements::{
    AddressFamily, MeasurementDefinition, MeasurementRequest, MeasurementType, PingOptions,
    ProbeSelector, ResultWindow, SslCertOptions,
};
pub use endpoints::probes::{Probe, ProbeStream};
pub use filters::{FilterKey, ProbeFilters, ProbeStatus};
pub use paginate::{IdCursor, RecordStream};
pub use response::{CreatedMeasurement, CreatedMeasurements, Page};
