//! One visualized peer and its time-driven animation state.
//!
//! Nothing here reads a clock: every query takes the current timestamp, so
//! the state machine can be stepped deterministically.

use crate::{
    animation::easing::{decay, ease_out_cubic, ease_out_quad, progress},
    core::{config::LifecycleConfig, geo::LatLng},
    nodes::{
        network::{Direction, LocationStatus, NetworkType},
        placement::Placement,
        snapshot::{PeerId, PeerRecord},
    },
    rendering::context::Rgba,
};
use std::{f64::consts::TAU, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodePhase {
    /// Opacity still easing in
    Spawning,
    /// Faded in, arrival bloom still playing
    Arrival,
    Steady,
    FadingOut,
    /// Fade-out complete; the manager purges the entity
    Removed,
}

#[derive(Debug, Clone)]
pub struct NodeEntity {
    pub id: PeerId,
    pub position: LatLng,
    pub placeholder: bool,
    pub network: NetworkType,
    pub direction: Direction,
    pub location_status: LocationStatus,
    pub latency: Option<Duration>,
    /// Latest record, kept for overlays and the peer table
    pub record: PeerRecord,
    spawned_at: Duration,
    faded_at: Option<Duration>,
    connection_age_at_sync: Option<Duration>,
    synced_at: Duration,
    phase_offset: f64,
}

/// Everything a painter needs to draw a node for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub phase: NodePhase,
    pub color: Rgba,
    pub opacity: f64,
    pub brightness: f64,
    pub radius: f64,
    pub glow_radius: f64,
    pub glow_alpha: f64,
    pub arrival: Option<ArrivalBloom>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalBloom {
    pub ring_radius: f64,
    pub ring_alpha: f64,
    pub glow_alpha: f64,
}

/// Fields refreshed from a peer record on every reconciliation
#[derive(Debug, Clone)]
pub struct NodeUpdate {
    pub record: PeerRecord,
    pub network: NetworkType,
    pub placement: Placement,
    pub connection_age: Option<Duration>,
}

impl NodeEntity {
    /// Creates a new entity spawned at `spawned_at`
    pub fn new(id: PeerId, update: NodeUpdate, spawned_at: Duration) -> Self {
        let mut entity = Self {
            id,
            position: update.placement.position(),
            placeholder: update.placement.is_placeholder(),
            network: update.network,
            direction: update.record.direction(),
            location_status: update.record.location_status(),
            latency: update.record.latency(),
            record: PeerRecord::default(),
            spawned_at,
            faded_at: None,
            connection_age_at_sync: None,
            synced_at: spawned_at,
            // Golden-ratio spread keeps neighbouring ids out of phase
            phase_offset: (id as f64 * 0.618_033_988_75).fract() * TAU,
        };
        entity.apply(update, spawned_at);
        entity
    }

    /// Refreshes mutable fields in place. Identity and spawn time stay.
    pub fn apply(&mut self, update: NodeUpdate, now: Duration) {
        self.position = update.placement.position();
        self.placeholder = update.placement.is_placeholder();
        self.network = update.network;
        self.direction = update.record.direction();
        self.location_status = update.record.location_status();
        self.latency = update.record.latency();
        self.connection_age_at_sync = update.connection_age;
        self.synced_at = now;
        self.record = update.record;
    }

    pub fn is_alive(&self) -> bool {
        self.faded_at.is_none()
    }

    pub fn spawned_at(&self) -> Duration {
        self.spawned_at
    }

    pub fn faded_at(&self) -> Option<Duration> {
        self.faded_at
    }

    /// Starts the fade-out. Returns `false` if it had already started.
    pub fn mark_gone(&mut self, now: Duration) -> bool {
        if self.faded_at.is_some() {
            return false;
        }
        self.faded_at = Some(now);
        true
    }

    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.spawned_at)
    }

    pub fn fade_age(&self, now: Duration) -> Option<Duration> {
        self.faded_at.map(|start| now.saturating_sub(start))
    }

    /// Connection age extrapolated from the last sync
    pub fn connection_age(&self, now: Duration) -> Option<Duration> {
        self.connection_age_at_sync
            .map(|age| age.saturating_add(now.saturating_sub(self.synced_at)))
    }

    pub fn phase(&self, now: Duration, config: &LifecycleConfig) -> NodePhase {
        if let Some(fade_age) = self.fade_age(now) {
            return if fade_age >= config.fade_out() {
                NodePhase::Removed
            } else {
                NodePhase::FadingOut
            };
        }
        let age = self.age(now).as_secs_f64();
        if age < config.fade_in_secs {
            NodePhase::Spawning
        } else if age < config.arrival_secs {
            NodePhase::Arrival
        } else {
            NodePhase::Steady
        }
    }

    pub fn should_purge(&self, now: Duration, config: &LifecycleConfig) -> bool {
        self.phase(now, config) == NodePhase::Removed
    }

    pub fn visual(&self, now: Duration, config: &LifecycleConfig) -> NodeVisual {
        let phase = self.phase(now, config);
        let age = self.age(now).as_secs_f64();

        let fade_in = ease_out_quad(progress(age, config.fade_in_secs));
        let fade_out = self
            .fade_age(now)
            .map(|fade_age| {
                decay(
                    progress(fade_age.as_secs_f64(), config.fade_out_secs),
                    config.fade_out_exponent,
                )
            })
            .unwrap_or(1.0);
        let opacity = fade_in * fade_out;

        let connection_secs = self
            .connection_age(now)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let brightness = config.brightness_floor
            + (config.brightness_ceiling - config.brightness_floor)
                * ease_out_cubic(progress(connection_secs, config.brightness_ramp_secs));

        let mut pulse = self.steady_pulse(age, connection_secs, config);
        let arrival = if age < config.arrival_secs {
            let t = progress(age, config.arrival_secs);
            let remaining = 1.0 - t;
            pulse += 0.35 * (config.arrival_pulse_speed * age).sin().abs() * remaining;
            Some(ArrivalBloom {
                ring_radius: config.base_radius_px
                    + (config.arrival_ring_radius_px - config.base_radius_px) * ease_out_cubic(t),
                ring_alpha: decay(t, 2.0) * opacity,
                glow_alpha: decay(t, 1.5) * opacity,
            })
        } else {
            None
        };

        NodeVisual {
            phase,
            color: self.network.color(),
            opacity,
            brightness,
            radius: config.base_radius_px * pulse,
            glow_radius: config.glow_radius_px * pulse,
            glow_alpha: 0.3 * brightness * opacity,
            arrival,
        }
    }

    /// Direction-dependent breathing. Young connections run faster; the
    /// extra speed is integrated over connection age so the phase never
    /// jumps as it relaxes.
    fn steady_pulse(&self, age: f64, connection_secs: f64, config: &LifecycleConfig) -> f64 {
        let ramp = config.nervous_ramp_secs;
        let nervous_phase = if ramp > 0.0 {
            let remaining = 1.0 - progress(connection_secs, ramp);
            config.nervous_extra_speed * ramp / 3.0 * (1.0 - remaining.powi(3))
        } else {
            0.0
        };

        match self.direction {
            Direction::Inbound => {
                let angle = config.inbound_pulse_speed * age + nervous_phase + self.phase_offset;
                1.0 + config.inbound_pulse_amplitude * angle.sin()
            }
            Direction::Outbound => {
                let angle = config.outbound_pulse_speed * age + nervous_phase + self.phase_offset;
                1.0 + config.outbound_pulse_amplitude * angle.sin().abs()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::placement::placeholder_position;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn update(direction: &str, connection_age: Option<Duration>) -> NodeUpdate {
        NodeUpdate {
            record: PeerRecord {
                id: Some(1),
                direction: direction.to_string(),
                ..PeerRecord::default()
            },
            network: NetworkType::Ipv4,
            placement: Placement::Geolocated(LatLng::new(40.0, -74.0)),
            connection_age,
        }
    }

    #[test]
    fn test_phase_progression() {
        let config = LifecycleConfig::default();
        let mut node = NodeEntity::new(1, update("IN", None), secs(10.0));

        assert_eq!(node.phase(secs(10.0), &config), NodePhase::Spawning);
        assert_eq!(node.phase(secs(10.0 + config.fade_in_secs), &config), NodePhase::Arrival);
        assert_eq!(node.phase(secs(10.0 + config.arrival_secs), &config), NodePhase::Steady);

        assert!(node.mark_gone(secs(20.0)));
        assert!(!node.mark_gone(secs(21.0)));
        assert_eq!(node.faded_at(), Some(secs(20.0)));
        assert_eq!(node.phase(secs(20.0), &config), NodePhase::FadingOut);
        assert!(!node.should_purge(secs(20.0 + config.fade_out_secs - 0.01), &config));
        assert!(node.should_purge(secs(20.0 + config.fade_out_secs), &config));
    }

    #[test]
    fn test_opacity_envelope() {
        let config = LifecycleConfig::default();
        let mut node = NodeEntity::new(1, update("OUT", None), secs(0.0));

        assert_eq!(node.visual(secs(0.0), &config).opacity, 0.0);
        let mid = node.visual(secs(config.fade_in_secs / 2.0), &config).opacity;
        assert!((mid - 0.75).abs() < 1e-9);
        assert_eq!(node.visual(secs(5.0), &config).opacity, 1.0);

        node.mark_gone(secs(5.0));
        let half = node.visual(secs(5.0 + config.fade_out_secs / 2.0), &config).opacity;
        assert!((half - 0.5f64.powf(config.fade_out_exponent)).abs() < 1e-9);
        assert_eq!(node.visual(secs(5.0 + config.fade_out_secs), &config).opacity, 0.0);
    }

    #[test]
    fn test_arrival_bloom_only_while_arriving() {
        let config = LifecycleConfig::default();
        let node = NodeEntity::new(1, update("IN", None), secs(0.0));

        let early = node.visual(secs(1.0), &config).arrival.unwrap();
        let later = node.visual(secs(2.0), &config).arrival.unwrap();
        assert!(later.ring_radius > early.ring_radius);
        assert!(later.ring_alpha < early.ring_alpha);
        assert!(node.visual(secs(config.arrival_secs), &config).arrival.is_none());
    }

    #[test]
    fn test_brightness_follows_connection_age() {
        let config = LifecycleConfig::default();
        let fresh = NodeEntity::new(1, update("IN", Some(secs(0.0))), secs(0.0));
        let veteran = NodeEntity::new(2, update("IN", Some(secs(86_400.0))), secs(0.0));

        let now = secs(10.0);
        let fresh_brightness = fresh.visual(now, &config).brightness;
        assert!(fresh_brightness > config.brightness_floor);
        assert!(fresh_brightness < config.brightness_ceiling);
        assert!((veteran.visual(now, &config).brightness - config.brightness_ceiling).abs() < 1e-12);

        // Unknown ages sit at the floor
        let unknown = NodeEntity::new(3, update("IN", None), secs(0.0));
        assert_eq!(unknown.visual(now, &config).brightness, config.brightness_floor);
    }

    #[test]
    fn test_connection_age_extrapolates_from_sync() {
        let mut node = NodeEntity::new(1, update("IN", Some(secs(100.0))), secs(50.0));
        assert_eq!(node.connection_age(secs(60.0)), Some(secs(110.0)));

        node.apply(update("IN", Some(secs(200.0))), secs(70.0));
        assert_eq!(node.connection_age(secs(75.0)), Some(secs(205.0)));
        // Spawn time is untouched by updates
        assert_eq!(node.spawned_at(), secs(50.0));
    }

    #[test]
    fn test_pulse_shape_by_direction() {
        let config = LifecycleConfig::default();
        let outbound = NodeEntity::new(4, update("OUT", Some(secs(10_000.0))), secs(0.0));
        let inbound = NodeEntity::new(4, update("IN", Some(secs(10_000.0))), secs(0.0));

        let mut inbound_below_base = false;
        for step in 0..400 {
            let now = secs(config.arrival_secs + step as f64 * 0.05);
            let out = outbound.visual(now, &config).radius;
            assert!(out >= config.base_radius_px - 1e-9);
            assert!(out <= config.base_radius_px * (1.0 + config.outbound_pulse_amplitude) + 1e-9);
            if inbound.visual(now, &config).radius < config.base_radius_px {
                inbound_below_base = true;
            }
        }
        assert!(inbound_below_base);
    }

    #[test]
    fn test_apply_moves_placeholder() {
        let mut node = NodeEntity::new(1, update("IN", None), secs(0.0));
        assert!(!node.placeholder);

        let key_position = placeholder_position("10.0.0.1");
        let mut pending = update("IN", None);
        pending.placement = Placement::Placeholder(key_position);
        node.apply(pending, secs(1.0));
        assert!(node.placeholder);
        assert_eq!(node.position, key_position);
    }
}
