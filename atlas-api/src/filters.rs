//! Probe search filters.
//!
//! Geo and country searches accept additional filters. Only the keys in
//! [`FilterKey`] are recognized; anything else is rejected before a request
//! is made.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use atlas_core::error::{AtlasError, AtlasResult};

use crate::client::QueryParams;

/// Keys set by the searches themselves, which filters may not override.
const RESERVED_KEYS: &[&str] = &[
    "id__gt",
    "id__in",
    "page_size",
    "sort",
    "radius",
    "country_code",
];

/// A recognized probe filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    /// Probe is announced in this ASN, either address family.
    Asn,
    /// IPv4 ASN.
    AsnV4,
    /// IPv6 ASN.
    AsnV6,
    /// IPv4 address lies inside this prefix.
    PrefixV4,
    /// IPv6 address lies inside this prefix.
    PrefixV6,
    /// Anchors only (`true`) or no anchors (`false`).
    IsAnchor,
    /// Public probes only (`true`) or private only (`false`).
    IsPublic,
    /// Connection status.
    Status,
    /// Every listed tag must be present on the probe.
    Tags,
}

impl FilterKey {
    pub const ALL: &'static [FilterKey] = &[
        FilterKey::Asn,
        FilterKey::AsnV4,
        FilterKey::AsnV6,
        FilterKey::PrefixV4,
        FilterKey::PrefixV6,
        FilterKey::IsAnchor,
        FilterKey::IsPublic,
        FilterKey::Status,
        FilterKey::Tags,
    ];

    /// Query parameter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Asn => "asn",
            FilterKey::AsnV4 => "asn_v4",
            FilterKey::AsnV6 => "asn_v6",
            FilterKey::PrefixV4 => "prefix_v4",
            FilterKey::PrefixV6 => "prefix_v6",
            FilterKey::IsAnchor => "is_anchor",
            FilterKey::IsPublic => "is_public",
            FilterKey::Status => "status",
            FilterKey::Tags => "tags",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = AtlasError;

    fn from_str(s: &str) -> AtlasResult<Self> {
        let key = s.trim();
        if let Some(found) = FilterKey::ALL.iter().find(|k| k.as_str() == key) {
            return Ok(*found);
        }
        if RESERVED_KEYS.contains(&key) {
            return Err(AtlasError::InvalidFilter(format!(
                "{key} is set by the search and cannot be used as a filter"
            )));
        }
        Err(AtlasError::InvalidFilter(format!("unrecognized filter key: {key}")))
    }
}

/// Probe connection status as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    NeverConnected = 0,
    Connected = 1,
    Disconnected = 2,
    Abandoned = 3,
}

impl ProbeStatus {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl FromStr for ProbeStatus {
    type Err = AtlasError;

    fn from_str(s: &str) -> AtlasResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "never-connected" | "never_connected" => Ok(ProbeStatus::NeverConnected),
            "1" | "connected" => Ok(ProbeStatus::Connected),
            "2" | "disconnected" => Ok(ProbeStatus::Disconnected),
            "3" | "abandoned" => Ok(ProbeStatus::Abandoned),
            _ => Err(AtlasError::InvalidFilter(format!("unknown probe status: {s}"))),
        }
    }
}

/// Filters merged into a geo or country probe search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeFilters {
    asn: Option<u32>,
    asn_v4: Option<u32>,
    asn_v6: Option<u32>,
    prefix_v4: Option<String>,
    prefix_v6: Option<String>,
    is_anchor: Option<bool>,
    is_public: Option<bool>,
    status: Option<ProbeStatus>,
    tags: Vec<String>,
}

impl ProbeFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asn(mut self, asn: u32) -> Self {
        self.asn = Some(asn);
        self
    }

    pub fn asn_v4(mut self, asn: u32) -> Self {
        self.asn_v4 = Some(asn);
        self
    }

    pub fn asn_v6(mut self, asn: u32) -> Self {
        self.asn_v6 = Some(asn);
        self
    }

    /// Restrict to an IPv4 prefix such as "193.0.0.0/21".
    pub fn prefix_v4(mut self, prefix: &str) -> AtlasResult<Self> {
        self.prefix_v4 = Some(parse_prefix(FilterKey::PrefixV4, prefix)?);
        Ok(self)
    }

    /// Restrict to an IPv6 prefix such as "2001:67c:2e8::/48".
    pub fn prefix_v6(mut self, prefix: &str) -> AtlasResult<Self> {
        self.prefix_v6 = Some(parse_prefix(FilterKey::PrefixV6, prefix)?);
        Ok(self)
    }

    pub fn is_anchor(mut self, anchor: bool) -> Self {
        self.is_anchor = Some(anchor);
        self
    }

    pub fn is_public(mut self, public: bool) -> Self {
        self.is_public = Some(public);
        self
    }

    pub fn status(mut self, status: ProbeStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Require a tag. Repeated calls accumulate.
    pub fn tag(mut self, tag: &str) -> AtlasResult<Self> {
        self.tags.push(parse_tag(tag)?);
        Ok(self)
    }

    /// Parse `key=value` style pairs, rejecting unrecognized keys and
    /// malformed values. A repeated key overwrites, except `tags`, which
    /// accumulates.
    pub fn from_pairs<I, K, V>(pairs: I) -> AtlasResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();
        for (key, value) in pairs {
            let key: FilterKey = key.as_ref().parse()?;
            let value = value.as_ref().trim();
            filters = match key {
                FilterKey::Asn => filters.asn(parse_asn(key, value)?),
                FilterKey::AsnV4 => filters.asn_v4(parse_asn(key, value)?),
                FilterKey::AsnV6 => filters.asn_v6(parse_asn(key, value)?),
                FilterKey::PrefixV4 => filters.prefix_v4(value)?,
                FilterKey::PrefixV6 => filters.prefix_v6(value)?,
                FilterKey::IsAnchor => filters.is_anchor(parse_bool(key, value)?),
                FilterKey::IsPublic => filters.is_public(parse_bool(key, value)?),
                FilterKey::Status => filters.status(value.parse()?),
                FilterKey::Tags => {
                    let mut f = filters;
                    for tag in value.split(',').filter(|t| !t.trim().is_empty()) {
                        f = f.tag(tag)?;
                    }
                    f
                }
            };
        }
        Ok(filters)
    }

    /// Parse a single `key=value` string.
    pub fn parse_pair(pair: &str) -> AtlasResult<(String, String)> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| AtlasError::InvalidFilter(format!("expected key=value, got {pair}")))?;
        Ok((key.trim().to_string(), value.trim().to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    /// Render as query parameters.
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        let mut push =
            |key: FilterKey, value: String| params.push((key.as_str().to_string(), value));

        if let Some(asn) = self.asn {
            push(FilterKey::Asn, asn.to_string());
        }
        if let Some(asn) = self.asn_v4 {
            push(FilterKey::AsnV4, asn.to_string());
        }
        if let Some(asn) = self.asn_v6 {
            push(FilterKey::AsnV6, asn.to_string());
        }
        if let Some(ref prefix) = self.prefix_v4 {
            push(FilterKey::PrefixV4, prefix.clone());
        }
        if let Some(ref prefix) = self.prefix_v6 {
            push(FilterKey::PrefixV6, prefix.clone());
        }
        if let Some(anchor) = self.is_anchor {
            push(FilterKey::IsAnchor, anchor.to_string());
        }
        if let Some(public) = self.is_public {
            push(FilterKey::IsPublic, public.to_string());
        }
        if let Some(status) = self.status {
            push(FilterKey::Status, status.code().to_string());
        }
        if !self.tags.is_empty() {
            push(FilterKey::Tags, self.tags.join(","));
        }
        params
    }
}

fn parse_asn(key: FilterKey, value: &str) -> AtlasResult<u32> {
    let digits = value
        .strip_prefix("AS")
        .or_else(|| value.strip_prefix("as"))
        .unwrap_or(value);
    digits
        .parse()
        .map_err(|_| AtlasError::InvalidFilter(format!("{key}: not an AS number: {value}")))
}

fn parse_bool(key: FilterKey, value: &str) -> AtlasResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AtlasError::InvalidFilter(format!("{key}: not a boolean: {value}"))),
    }
}

fn parse_prefix(key: FilterKey, value: &str) -> AtlasResult<String> {
    let invalid = || AtlasError::InvalidFilter(format!("{key}: not a prefix: {value}"));
    let value = value.trim();
    let (addr, len) = value.split_once('/').ok_or_else(invalid)?;
    let len: u8 = len.parse().map_err(|_| invalid())?;

    let ok = match key {
        FilterKey::PrefixV4 => addr.parse::<Ipv4Addr>().is_ok() && len <= 32,
        _ => addr.parse::<Ipv6Addr>().is_ok() && len <= 128,
    };
    if ok {
        Ok(value.to_string())
    } else {
        Err(invalid())
    }
}

fn parse_tag(tag: &str) -> AtlasResult<String> {
    let tag = tag.trim();
    let valid = !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(tag.to_ascii_lowercase())
    } else {
        Err(AtlasError::InvalidFilter(format!("tags: not a tag slug: {tag}")))
    }
}
