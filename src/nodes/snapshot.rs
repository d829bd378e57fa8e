//! Data contracts consumed from the dashboard backend.
//!
//! Records are decoded one at a time so a single malformed peer never
//! discards the rest of the snapshot. Missing or `null` fields fall back to
//! neutral defaults.

use crate::{
    core::geo::LatLng,
    nodes::network::{is_private_host, split_host_port, Direction, LocationStatus, NetworkType},
    Result,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Identifier assigned to a peer connection by the node
pub type PeerId = u64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<PeerId>,
    #[serde(deserialize_with = "lenient_string")]
    pub network: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ip: String,
    #[serde(deserialize_with = "lenient_string")]
    pub port: String,
    #[serde(deserialize_with = "lenient_string")]
    pub direction: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subver: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub region: String,
    #[serde(rename = "regionName", deserialize_with = "lenient_string")]
    pub region_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(rename = "countryCode", deserialize_with = "lenient_string")]
    pub country_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub continent: String,
    #[serde(rename = "continentCode", deserialize_with = "lenient_string")]
    pub continent_code: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub bytessent: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub bytesrecv: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub ping_ms: f64,
    /// Unix seconds the connection was opened, 0 when unknown
    #[serde(deserialize_with = "lenient_f64")]
    pub conntime: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub version: f64,
    #[serde(deserialize_with = "lenient_string")]
    pub connection_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub services_abbrev: String,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub lon: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub isp: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location_status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub addr: String,
}

impl PeerRecord {
    /// Host part of the peer address
    pub fn host(&self) -> &str {
        if !self.ip.is_empty() {
            self.ip.as_str()
        } else {
            split_host_port(&self.addr).0
        }
    }

    /// Network tag, inferred from the address when the tag is absent.
    /// An unrecognized tag is returned as an error.
    pub fn network_type(&self) -> Result<NetworkType> {
        if self.network.trim().is_empty() {
            Ok(self.inferred_network())
        } else {
            NetworkType::from_tag(&self.network)
        }
    }

    pub fn inferred_network(&self) -> NetworkType {
        if self.addr.is_empty() {
            NetworkType::classify(&self.ip)
        } else {
            NetworkType::classify(&self.addr)
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::from_tag(&self.direction)
    }

    /// Geolocation status; private hosts are always `Private`
    pub fn location_status(&self) -> LocationStatus {
        if is_private_host(self.host()) {
            LocationStatus::Private
        } else {
            LocationStatus::from_tag(&self.location_status)
        }
    }

    /// Usable public coordinates. `(0, 0)` is the backend's "no fix" value.
    pub fn coordinates(&self) -> Option<LatLng> {
        let (lat, lng) = (self.lat?, self.lon?);
        if lat == 0.0 && lng == 0.0 {
            return None;
        }
        LatLng::try_new(lat, lng).ok()
    }

    /// Stable key used for placeholder placement
    pub fn placement_key(&self) -> String {
        let host = self.host();
        if host.is_empty() {
            format!("peer-{}", self.id.unwrap_or_default())
        } else {
            host.to_string()
        }
    }

    /// Connection age as of `now_unix`, `None` when the open time is unknown
    pub fn connection_age_at(&self, now_unix: f64) -> Option<Duration> {
        if !(self.conntime.is_finite() && self.conntime > 0.0) {
            return None;
        }
        Duration::try_from_secs_f64((now_unix - self.conntime).max(0.0)).ok()
    }

    /// Observed round trip, `None` when unknown or out of range
    pub fn latency(&self) -> Option<Duration> {
        if self.ping_ms.is_finite() && self.ping_ms > 0.0 {
            Duration::try_from_secs_f64(self.ping_ms / 1000.0).ok()
        } else {
            None
        }
    }

    /// Human-readable place, falling back to the status
    pub fn display_location(&self) -> String {
        if !self.location.is_empty() {
            return self.location.clone();
        }
        match (self.city.is_empty(), self.country_code.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.country_code),
            (false, true) => self.city.clone(),
            (true, false) => self.country_code.clone(),
            (true, true) => self.location_status().label().to_ascii_uppercase(),
        }
    }
}

/// A decoded `/api/peers` response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerSnapshot {
    pub records: Vec<PeerRecord>,
    /// Entries that were not JSON objects of the expected shape
    pub malformed: usize,
}

impl PeerSnapshot {
    pub fn new(records: Vec<PeerRecord>) -> Self {
        Self {
            records,
            malformed: 0,
        }
    }

    /// Decodes a JSON array of peers record by record
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        let entries = match value {
            Value::Array(entries) => entries,
            other => {
                log::warn!("peer snapshot is not an array: {}", type_name(&other));
                return Self {
                    records: Vec::new(),
                    malformed: 1,
                };
            }
        };

        let mut snapshot = Self::default();
        for entry in entries {
            match serde_json::from_value::<PeerRecord>(entry) {
                Ok(record) => snapshot.records.push(record),
                Err(err) => {
                    log::warn!("skipping malformed peer record: {err}");
                    snapshot.malformed += 1;
                }
            }
        }
        snapshot
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockSummary {
    pub height: u64,
    /// Unix seconds
    pub time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSummary {
    pub size_gb: f64,
    pub pruned: bool,
    pub indexed: bool,
    pub ibd: bool,
}

/// `/api/info` fields the map displays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfo {
    pub last_block: Option<BlockSummary>,
    pub blockchain: Option<ChainSummary>,
    pub connected: Option<u64>,
    pub mempool_size: Option<u64>,
    pub subversion: Option<String>,
    pub internet_state: Option<String>,
}

impl NodeInfo {
    pub fn is_syncing(&self) -> bool {
        self.blockchain.as_ref().map(|c| c.ibd).unwrap_or(false)
    }
}

/// Resource usage and throughput sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStats {
    #[serde(deserialize_with = "lenient_f64")]
    pub rx_bps: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub tx_bps: f64,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub cpu_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub mem_pct: Option<f64>,
}

impl SystemStats {
    /// Takes CPU and memory usage from an `/api/stats` body, where they sit
    /// under `system_stats`. Absent or non-numeric values become `None`.
    pub fn merge_usage(&mut self, stats: &Value) {
        let section = stats.get("system_stats");
        let percent = |key: &str| section.and_then(|s| s.get(key)).and_then(number_from_value);
        self.cpu_pct = percent("cpu_pct");
        self.mem_pct = percent("mem_pct");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Connected,
    Disconnected,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChangeKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "connected" => ChangeKind::Connected,
            "disconnected" => ChangeKind::Disconnected,
            _ => ChangeKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangePeer {
    #[serde(deserialize_with = "lenient_string")]
    pub ip: String,
    #[serde(deserialize_with = "lenient_string")]
    pub port: String,
    #[serde(deserialize_with = "lenient_string")]
    pub network: String,
}

/// One connect/disconnect event from `/api/changes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Unix seconds
    #[serde(default, deserialize_with = "lenient_f64")]
    pub time: f64,
    #[serde(rename = "type", default, deserialize_with = "lenient_change_kind")]
    pub kind: ChangeKind,
    #[serde(default, deserialize_with = "lenient_change_peer")]
    pub peer: ChangePeer,
}

impl ChangeEvent {
    /// Decodes a `/api/changes` body event by event, dropping entries
    /// that are not objects
    pub fn list_from_json_str(json: &str) -> Result<Vec<Self>> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::list_from_value(value))
    }

    pub fn list_from_value(value: Value) -> Vec<Self> {
        let Value::Array(entries) = value else {
            log::warn!("change feed is not an array: {}", type_name(&value));
            return Vec::new();
        };
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<ChangeEvent>(entry) {
                Ok(event) => Some(event),
                Err(err) => {
                    log::warn!("skipping malformed change event: {err}");
                    None
                }
            })
            .collect()
    }
}

/// Result of a disconnect or ban request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub banned_ip: Option<String>,
    pub network: Option<String>,
}

impl ActionOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Two most significant non-zero units without spaces: `3d4h`, `5m12s`,
/// `42s`. Unknown ages render as `-`.
pub fn format_connection_age(age: Option<Duration>) -> String {
    let Some(age) = age else {
        return "-".to_string();
    };
    let total = age.as_secs();
    let units = [
        (total / 86_400, 'd'),
        ((total % 86_400) / 3_600, 'h'),
        ((total % 3_600) / 60, 'm'),
        (total % 60, 's'),
    ];

    let Some(first) = units.iter().position(|(value, _)| *value > 0) else {
        return "0s".to_string();
    };
    let mut out = format!("{}{}", units[first].0, units[first].1);
    if let Some((value, unit)) = units[first + 1..].iter().find(|(value, _)| *value > 0) {
        out.push_str(&format!("{value}{unit}"));
    }
    out
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(number_from_value))
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.unwrap_or_default())
}

fn lenient_change_kind<'de, D>(deserializer: D) -> std::result::Result<ChangeKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(tag)) => ChangeKind::from_tag(&tag),
        _ => ChangeKind::Unknown,
    })
}

fn lenient_change_peer<'de, D>(deserializer: D) -> std::result::Result<ChangePeer, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => ChangePeer::default(),
    })
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<PeerId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<PeerId>().ok(),
        _ => None,
    })
}
