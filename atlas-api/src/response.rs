//! Response envelope types.
//!
//! List endpoints wrap their records in a page envelope:
//! ```json
//! { "count": 1042, "next": "https://...", "previous": null, "results": [ ... ] }
//! ```
//! Measurement creation answers with `{ "measurements": [ ... ] }`.

use serde::{Deserialize, Serialize};

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T = serde_json::Value> {
    /// Total matches across all pages, when the platform reports it.
    #[serde(default)]
    pub count: Option<u64>,
    /// URL of the next page, or null on the last page. The key itself is required.
    pub next: Option<String>,
    /// URL of the previous page.
    #[serde(default)]
    pub previous: Option<String>,
    /// Records on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Whether the platform reported another page after this one.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Body returned by the measurement creation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedMeasurements {
    #[serde(default)]
    pub measurements: Vec<CreatedMeasurement>,
}

/// Handle for a measurement that was just created.
///
/// The platform returns bare ids; a full record is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedMeasurement {
    Id(u64),
    Record(serde_json::Value),
}

impl CreatedMeasurement {
    /// The measurement id, usable with `measurement()` and `results()`.
    pub fn id(&self) -> Option<u64> {
        match self {
            CreatedMeasurement::Id(id) => Some(*id),
            CreatedMeasurement::Record(value) => value.get("id").and_then(|v| v.as_u64()),
        }
    }
}
