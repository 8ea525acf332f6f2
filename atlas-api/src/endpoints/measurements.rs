//! Measurement endpoints: one-off creation, metadata, and results.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::debug;
use uuid::Uuid;

use atlas_core::constants::RESULTS_STOP_MAX;
use atlas_core::error::{AtlasError, AtlasResult};

use crate::client::AtlasClient;
use crate::paginate::join_ids;
use crate::response::{CreatedMeasurement, CreatedMeasurements};

/// IP address family a measurement runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFamily {
    #[default]
    V4,
    V6,
}

impl AddressFamily {
    pub fn number(&self) -> u8 {
        match self {
            AddressFamily::V4 => 4,
            AddressFamily::V6 => 6,
        }
    }

    pub fn from_number(af: u8) -> AtlasResult<Self> {
        match af {
            4 => Ok(AddressFamily::V4),
            6 => Ok(AddressFamily::V6),
            other => Err(AtlasError::InvalidArgument(format!(
                "address family must be 4 or 6, got {other}"
            ))),
        }
    }
}

impl FromStr for AddressFamily {
    type Err = AtlasError;

    fn from_str(s: &str) -> AtlasResult<Self> {
        match s.trim() {
            "4" => Ok(AddressFamily::V4),
            "6" => Ok(AddressFamily::V6),
            _ => Err(AtlasError::InvalidArgument(format!(
                "address family must be 4 or 6, got {s}"
            ))),
        }
    }
}

impl Serialize for AddressFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    Ping,
    #[serde(rename = "sslcert")]
    SslCert,
}

impl MeasurementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::Ping => "ping",
            MeasurementType::SslCert => "sslcert",
        }
    }
}

/// One measurement definition in a creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementDefinition {
    pub af: AddressFamily,
    pub description: String,
    pub is_oneoff: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet_interval: Option<u32>,
    pub resolve_on_probe: bool,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: MeasurementType,
}

/// Which probes must run the measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeSelector {
    pub requested: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
}

impl ProbeSelector {
    /// Select exactly these probes.
    pub fn probes(ids: &[u64]) -> Self {
        Self {
            requested: ids.len(),
            kind: "probes",
            value: join_ids(ids),
        }
    }
}

/// Body of `POST /measurements/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRequest {
    pub definitions: Vec<MeasurementDefinition>,
    pub probes: Vec<ProbeSelector>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PingOptions {
    /// Packets per probe.
    pub packets: u32,
    /// Milliseconds between packets.
    pub packet_interval: u32,
    pub address_family: AddressFamily,
    /// Resolve the target name on each probe rather than once centrally.
    pub resolve_on_probe: bool,
}

impl Default for PingOptions {
    fn default() -> Self {
        Self {
            packets: 4,
            packet_interval: 100,
            address_family: AddressFamily::V4,
            resolve_on_probe: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SslCertOptions {
    pub address_family: AddressFamily,
    pub resolve_on_probe: bool,
}

impl Default for SslCertOptions {
    fn default() -> Self {
        Self {
            address_family: AddressFamily::V4,
            resolve_on_probe: true,
        }
    }
}

/// `"{client_name} - {kind} - {32 hex chars}"`, unique per call.
pub fn describe(client_name: &str, kind: MeasurementType) -> String {
    format!("{client_name} - {} - {}", kind.as_str(), Uuid::new_v4().simple())
}

impl MeasurementRequest {
    /// One-off ping of `target` from `probe_ids`.
    pub fn ping(client_name: &str, target: &str, probe_ids: &[u64], opts: &PingOptions) -> Self {
        let definition = MeasurementDefinition {
            af: opts.address_family,
            description: describe(client_name, MeasurementType::Ping),
            is_oneoff: true,
            packets: Some(opts.packets),
            packet_interval: Some(opts.packet_interval),
            resolve_on_probe: opts.resolve_on_probe,
            target: target.to_string(),
            kind: MeasurementType::Ping,
        };
        Self::single(definition, probe_ids)
    }

    /// One-off TLS certificate check of `target` from `probe_ids`.
    pub fn sslcert(
        client_name: &str,
        target: &str,
        probe_ids: &[u64],
        opts: &SslCertOptions,
    ) -> Self {
        let definition = MeasurementDefinition {
            af: opts.address_family,
            description: describe(client_name, MeasurementType::SslCert),
            is_oneoff: true,
            packets: None,
            packet_interval: None,
            resolve_on_probe: opts.resolve_on_probe,
            target: target.to_string(),
            kind: MeasurementType::SslCert,
        };
        Self::single(definition, probe_ids)
    }

    fn single(definition: MeasurementDefinition, probe_ids: &[u64]) -> Self {
        Self {
            definitions: vec![definition],
            probes: vec![ProbeSelector::probes(probe_ids)],
        }
    }
}

/// Time window for result retrieval, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultWindow {
    pub start: i64,
    pub stop: i64,
}

impl Default for ResultWindow {
    fn default() -> Self {
        Self {
            start: 0,
            stop: RESULTS_STOP_MAX,
        }
    }
}

impl ResultWindow {
    pub fn between(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self {
            start: start.timestamp(),
            stop: stop.timestamp(),
        }
    }

    /// From `start` until the open end.
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: start.timestamp(),
            ..Self::default()
        }
    }

    fn to_query(self) -> Vec<(String, String)> {
        vec![
            ("start".to_string(), self.start.to_string()),
            ("stop".to_string(), self.stop.to_string()),
        ]
    }
}

impl AtlasClient {
    /// Create a one-off ping measurement and return its handle.
    pub async fn ping(
        &self,
        target: &str,
        probe_ids: &[u64],
        opts: &PingOptions,
    ) -> AtlasResult<CreatedMeasurement> {
        debug!(
            parent: self.span(),
            target,
            probe_ids = ?probe_ids,
            address_family = opts.address_family.number(),
            resolve_on_probe = opts.resolve_on_probe,
            "ping"
        );

        let request = MeasurementRequest::ping(self.name(), target, probe_ids, opts);
        self.create_measurement(&request).await
    }

    /// Create a one-off TLS certificate check and return its handle.
    pub async fn sslcert(
        &self,
        target: &str,
        probe_ids: &[u64],
        opts: &SslCertOptions,
    ) -> AtlasResult<CreatedMeasurement> {
        debug!(
            parent: self.span(),
            target,
            probe_ids = ?probe_ids,
            address_family = opts.address_family.number(),
            resolve_on_probe = opts.resolve_on_probe,
            "sslcert"
        );

        let request = MeasurementRequest::sslcert(self.name(), target, probe_ids, opts);
        self.create_measurement(&request).await
    }

    /// Submit a creation request; the first created measurement is returned.
    pub async fn create_measurement(
        &self,
        request: &MeasurementRequest,
    ) -> AtlasResult<CreatedMeasurement> {
        let created: CreatedMeasurements = self
            .post_json(&self.url("/measurements/"), request)
            .await?;
        created.measurements.into_iter().next().ok_or_else(|| {
            AtlasError::UnexpectedResponse("creation response listed no measurements".into())
        })
    }

    /// Full metadata for one measurement.
    pub async fn measurement(&self, measurement_id: u64) -> AtlasResult<serde_json::Value> {
        debug!(parent: self.span(), measurement_id, "measurement");

        self.get_json(&self.url(&format!("/measurements/{measurement_id}/")), &[])
            .await
    }

    /// Results for one measurement within `window`.
    ///
    /// Sent without credentials: results of public measurements need none,
    /// and a stale key would turn the read into a 401.
    pub async fn results(
        &self,
        measurement_id: u64,
        window: ResultWindow,
    ) -> AtlasResult<serde_json::Value> {
        debug!(
            parent: self.span(),
            measurement_id,
            start = window.start,
            stop = window.stop,
            "results"
        );

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(""));

        self.get_json_with_headers(
            &self.url(&format!("/measurements/{measurement_id}/results/")),
            &window.to_query(),
            &headers,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn is_description(description: &str, name: &str, kind: &str) -> bool {
        let prefix = format!("{name} - {kind} - ");
        match description.strip_prefix(&prefix) {
            Some(hex) => hex.len() == 32 && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => false,
        }
    }

    #[test]
    fn test_ping_payload() {
        let opts = PingOptions::default();
        let request = MeasurementRequest::ping("octo", "example.com", &[1, 2, 3], &opts);
        let json = serde_json::to_value(&request).unwrap();

        let def = &json["definitions"][0];
        assert_eq!(def["type"], "ping");
        assert_eq!(def["af"], 4);
        assert_eq!(def["is_oneoff"], true);
        assert_eq!(def["packets"], 4);
        assert_eq!(def["packet_interval"], 100);
        assert_eq!(def["resolve_on_probe"], true);
        assert_eq!(def["target"], "example.com");
        assert!(is_description(def["description"].as_str().unwrap(), "octo", "ping"));

        let probes = &json["probes"][0];
        assert_eq!(probes["requested"], 3);
        assert_eq!(probes["type"], "probes");
        assert_eq!(probes["value"], "1,2,3");
    }

    #[test]
    fn test_sslcert_payload_has_no_ping_fields() {
        let opts = SslCertOptions {
            address_family: AddressFamily::V6,
            resolve_on_probe: false,
        };
        let request = MeasurementRequest::sslcert("octo", "example.com", &[7], &opts);
        let json = serde_json::to_value(&request).unwrap();

        let def = json["definitions"][0].as_object().unwrap();
        assert_eq!(def["type"], "sslcert");
        assert_eq!(def["af"], 6);
        assert_eq!(def["resolve_on_probe"], false);
        assert!(!def.contains_key("packets"));
        assert!(!def.contains_key("packet_interval"));
        assert!(is_description(def["description"].as_str().unwrap(), "octo", "sslcert"));
    }

    #[test]
    fn test_descriptions_differ_between_calls() {
        let opts = PingOptions::default();
        let a = MeasurementRequest::ping("octo", "example.com", &[1], &opts);
        let b = MeasurementRequest::ping("octo", "example.com", &[1], &opts);
        assert_ne!(a.definitions[0].description, b.definitions[0].description);

        let mut b = b;
        b.definitions[0].description = a.definitions[0].description.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_probe_list() {
        let selector = ProbeSelector::probes(&[]);
        assert_eq!(selector.requested, 0);
        assert_eq!(selector.value, "");
    }

    #[test]
    fn test_address_family() {
        assert_eq!(AddressFamily::from_number(6).unwrap(), AddressFamily::V6);
        assert!(matches!(
            AddressFamily::from_number(5),
            Err(AtlasError::InvalidArgument(_))
        ));
        assert_eq!(AddressFamily::default().number(), 4);

        assert_eq!("4".parse::<AddressFamily>().unwrap(), AddressFamily::V4);
        assert_eq!("6".parse::<AddressFamily>().unwrap(), AddressFamily::V6);
        assert!(matches!(
            "5".parse::<AddressFamily>(),
            Err(AtlasError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_result_window() {
        assert_eq!(
            ResultWindow::default(),
            ResultWindow {
                start: 0,
                stop: 9_999_999_999
            }
        );

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let stop = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let window = ResultWindow::between(start, stop);
        assert_eq!(window.start, 1_704_067_200);
        assert_eq!(window.stop - window.start, 86_400);
        assert_eq!(ResultWindow::since(start).stop, RESULTS_STOP_MAX);
    }
}
