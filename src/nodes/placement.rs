//! Deterministic stand-in positions for peers without public coordinates.
//!
//! The key is hashed with `FxHasher`, which is unseeded, so a given address
//! lands on the same spot on every poll and every run.

use crate::{
    core::geo::LatLng,
    nodes::{
        network::{LocationStatus, NetworkType},
        snapshot::PeerRecord,
    },
};
use fxhash::FxHasher;
use std::hash::{Hash, Hasher};

/// Remote open-ocean points placeholders cluster around
pub const ANCHORS: [LatLng; 5] = [
    LatLng { lat: -42.0, lng: -128.0 }, // South Pacific
    LatLng { lat: -46.0, lng: -18.0 },  // South Atlantic
    LatLng { lat: -38.0, lng: 82.0 },   // Indian Ocean
    LatLng { lat: 33.0, lng: -158.0 },  // North Pacific
    LatLng { lat: -58.0, lng: 148.0 },  // Southern Ocean
];

/// Half-width of the jitter box around an anchor, in degrees
pub const MAX_OFFSET_DEG: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Geolocated(LatLng),
    Placeholder(LatLng),
}

impl Placement {
    pub fn position(&self) -> LatLng {
        match self {
            Placement::Geolocated(p) | Placement::Placeholder(p) => *p,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Placement::Placeholder(_))
    }
}

pub fn stable_hash(key: &str) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Anchor chosen by the key plus a small hash-derived offset
pub fn placeholder_position(key: &str) -> LatLng {
    let hash = stable_hash(key);
    let anchor = ANCHORS[(hash % ANCHORS.len() as u64) as usize];
    let jitter = |bits: u64| ((bits & 0xffff) as f64 / 65_535.0 * 2.0 - 1.0) * MAX_OFFSET_DEG;
    LatLng::new(
        anchor.lat + jitter(hash >> 16),
        LatLng::wrap_lng(anchor.lng + jitter(hash >> 32)),
    )
}

/// Real coordinates for geolocated clearnet peers, a placeholder otherwise.
/// A status of `ok` without usable coordinates is treated as still pending.
pub fn place(record: &PeerRecord, network: NetworkType) -> Placement {
    if network.is_clearnet() && record.location_status() == LocationStatus::Ok {
        if let Some(position) = record.coordinates() {
            return Placement::Geolocated(position);
        }
    }
    Placement::Placeholder(placeholder_position(&record.placement_key()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_deterministic() {
        for key in ["10.0.0.7", "abcdefghijklmnop.onion", "peer-12", ""] {
            assert_eq!(placeholder_position(key), placeholder_position(key));
        }
    }

    #[test]
    fn test_placeholder_stays_near_an_anchor() {
        for i in 0..200 {
            let p = placeholder_position(&format!("192.168.0.{i}"));
            assert!(p.is_valid());
            let near = ANCHORS.iter().any(|a| {
                (a.lat - p.lat).abs() <= MAX_OFFSET_DEG + 1e-9
                    && (a.lng - p.lng).abs() <= MAX_OFFSET_DEG + 1e-9
            });
            assert!(near, "{p:?}");
        }
    }

    #[test]
    fn test_distinct_keys_spread_out() {
        let a = placeholder_position("10.0.0.1");
        let b = placeholder_position("10.0.0.2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_place_uses_coordinates_only_when_public_and_ok() {
        let geolocated = PeerRecord {
            id: Some(1),
            ip: "203.0.113.9".to_string(),
            location_status: "ok".to_string(),
            lat: Some(40.0),
            lon: Some(-74.0),
            ..PeerRecord::default()
        };
        assert_eq!(
            place(&geolocated, NetworkType::Ipv4),
            Placement::Geolocated(LatLng::new(40.0, -74.0))
        );

        // Overlay networks never reveal a location
        assert!(place(&geolocated, NetworkType::Onion).is_placeholder());

        let pending = PeerRecord {
            lat: None,
            ..geolocated.clone()
        };
        let placement = place(&pending, NetworkType::Ipv4);
        assert!(placement.is_placeholder());
        assert_eq!(placement.position(), placeholder_position("203.0.113.9"));
    }
}
