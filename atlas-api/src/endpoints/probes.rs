//! Probe endpoints.

use serde::{Deserialize, Serialize};
use tracing::debug;

use atlas_core::constants::PAGE_SIZE;

use crate::client::{AtlasClient, QueryParams};
use crate::filters::ProbeFilters;
use crate::paginate::{cursor_pages, id_batches, CursorKey, RecordStream};

/// Lazy stream of probe records.
pub type ProbeStream = RecordStream<Probe>;

/// A probe record. Only `id` is interpreted; everything else the platform
/// sends is kept as-is in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub id: u64,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Probe {
    pub fn country_code(&self) -> Option<&str> {
        self.fields.get("country_code").and_then(|v| v.as_str())
    }

    /// Connection status name, e.g. "Connected".
    pub fn status_name(&self) -> Option<&str> {
        self.fields
            .get("status")
            .and_then(|s| s.get("name"))
            .and_then(|v| v.as_str())
    }

    pub fn is_anchor(&self) -> bool {
        self.fields
            .get("is_anchor")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn asn_v4(&self) -> Option<u64> {
        self.fields.get("asn_v4").and_then(|v| v.as_u64())
    }

    pub fn asn_v6(&self) -> Option<u64> {
        self.fields.get("asn_v6").and_then(|v| v.as_u64())
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.get("description").and_then(|v| v.as_str())
    }
}

impl CursorKey for Probe {
    fn cursor_key(&self) -> u64 {
        self.id
    }
}

fn base_params() -> QueryParams {
    vec![
        ("page_size".to_string(), PAGE_SIZE.to_string()),
        ("sort".to_string(), "id".to_string()),
    ]
}

impl AtlasClient {
    /// Fetch probes by id, `PAGE_SIZE` ids per request.
    ///
    /// Records come back in the platform's order, which need not match
    /// `ids`. The caller's slice is copied; nothing is requested until the
    /// stream is polled.
    pub fn probes_by_id(&self, ids: &[u64]) -> ProbeStream {
        debug!(parent: self.span(), count = ids.len(), "probes_by_id");

        id_batches(self.clone(), self.url("/probes/"), base_params(), ids.to_vec())
    }

    /// Probes within `radius` km of (`lat`, `lon`), in ascending id order.
    pub fn probes_by_geo(
        &self,
        lat: f64,
        lon: f64,
        radius: f64,
        filters: &ProbeFilters,
    ) -> ProbeStream {
        debug!(parent: self.span(), lat, lon, radius, "probes_by_geo");

        let mut params = base_params();
        // Sorting by distance is not offered, so results stay id-ordered.
        params.push(("radius".to_string(), format!("{lat},{lon}:{radius}")));
        params.extend(filters.to_query());

        cursor_pages(self.clone(), self.url("/probes/"), params)
    }

    /// Probes in a country (ISO 3166-1 alpha-2), in ascending id order.
    pub fn probes_by_country(&self, country_code: &str, filters: &ProbeFilters) -> ProbeStream {
        debug!(parent: self.span(), country_code, "probes_by_country");

        let mut params = base_params();
        params.push(("country_code".to_string(), country_code.trim().to_string()));
        params.extend(filters.to_query());

        cursor_pages(self.clone(), self.url("/probes/"), params)
    }
}
