//! Configuration system for the peer map engine
//!
//! Options are grouped per concern and resolved from presets, so callers can
//! pick a profile and override only what they care about. Every group
//! deserializes with defaults filled in, which lets a partial JSON document
//! tweak a single field.

use crate::{core::constants, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineProfile {
    Balanced,
    LowPower,
    HighFidelity,
    Custom(EngineOptions),
}

impl EngineProfile {
    pub fn resolve(&self) -> EngineOptions {
        match self {
            Self::Balanced => EngineOptions::default(),
            Self::LowPower => EngineOptions {
                framerate: FrameTimingConfig { target_fps: 30 },
                camera: CameraConfig {
                    smoothing: 0.3,
                    ..CameraConfig::default()
                },
                lifecycle: LifecycleConfig {
                    glow_radius_px: 0.0,
                    ..LifecycleConfig::default()
                },
                polling: PollingConfig {
                    system_secs: 5.0,
                    ..PollingConfig::default()
                },
                ..EngineOptions::default()
            },
            Self::HighFidelity => EngineOptions {
                framerate: FrameTimingConfig { target_fps: 120 },
                camera: CameraConfig {
                    smoothing: 0.08,
                    ..CameraConfig::default()
                },
                ..EngineOptions::default()
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub framerate: FrameTimingConfig,
    pub camera: CameraConfig,
    pub lifecycle: LifecycleConfig,
    pub layers: LayerVisibilityConfig,
    pub interaction: InteractionConfig,
    pub polling: PollingConfig,
}

impl EngineOptions {
    /// Parses a (possibly partial) JSON document on top of the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTimingConfig {
    pub target_fps: u32,
}

impl FrameTimingConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}

impl Default for FrameTimingConfig {
    fn default() -> Self {
        Self {
            target_fps: constants::TARGET_FPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub reset_zoom: f64,
    /// Fraction of the remaining distance covered per frame
    pub smoothing: f64,
    pub snap_epsilon: f64,
    pub wheel_zoom_factor: f64,
    pub wrap_margin_px: f64,
    pub recenter_baseline_zoom: f64,
    pub recenter_step: f64,
    /// Clearance kept between a recentered node and the visible edges
    pub recenter_margin_px: f64,
    pub keyboard_pan_px: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: constants::DEFAULT_MIN_ZOOM,
            max_zoom: constants::DEFAULT_MAX_ZOOM,
            reset_zoom: constants::DEFAULT_MIN_ZOOM,
            smoothing: constants::CAMERA_SMOOTHING,
            snap_epsilon: 1e-4,
            wheel_zoom_factor: constants::WHEEL_ZOOM_FACTOR,
            wrap_margin_px: constants::WRAP_MARGIN_PX,
            recenter_baseline_zoom: constants::RECENTER_BASELINE_ZOOM,
            recenter_step: 0.25,
            recenter_margin_px: 24.0,
            keyboard_pan_px: 80.0,
        }
    }
}

/// Timing and shape of the per-node animation state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub fade_in_secs: f64,
    pub arrival_secs: f64,
    pub fade_out_secs: f64,
    pub fade_out_exponent: f64,
    pub brightness_floor: f64,
    pub brightness_ceiling: f64,
    /// Connection age over which brightness climbs from floor to ceiling
    pub brightness_ramp_secs: f64,
    /// Connection age over which the extra "nervous" pulse speed relaxes to zero
    pub nervous_ramp_secs: f64,
    pub nervous_extra_speed: f64,
    pub inbound_pulse_speed: f64,
    pub inbound_pulse_amplitude: f64,
    pub outbound_pulse_speed: f64,
    pub outbound_pulse_amplitude: f64,
    pub arrival_pulse_speed: f64,
    pub base_radius_px: f64,
    pub arrival_ring_radius_px: f64,
    pub glow_radius_px: f64,
}

/// Seconds from a config file as a `Duration`, clamped to
/// `[min_secs, MAX_CONFIGURED_SECS]`
pub fn clamped_secs(secs: f64, min_secs: f64) -> Duration {
    Duration::from_secs_f64(secs.max(min_secs).min(constants::MAX_CONFIGURED_SECS))
}

impl LifecycleConfig {
    pub fn fade_out(&self) -> Duration {
        clamped_secs(self.fade_out_secs, 0.0)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            fade_in_secs: 0.8,
            arrival_secs: 2.5,
            fade_out_secs: 2.0,
            fade_out_exponent: 2.0,
            brightness_floor: 0.45,
            brightness_ceiling: 1.0,
            brightness_ramp_secs: 600.0,
            nervous_ramp_secs: 120.0,
            nervous_extra_speed: 2.5,
            inbound_pulse_speed: 1.1,
            inbound_pulse_amplitude: 0.15,
            outbound_pulse_speed: 2.2,
            outbound_pulse_amplitude: 0.25,
            arrival_pulse_speed: 9.0,
            base_radius_px: 3.5,
            arrival_ring_radius_px: 28.0,
            glow_radius_px: 10.0,
        }
    }
}

/// Zoom gate of one static layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerThreshold {
    pub min_zoom: f64,
    /// Zoom distance past `min_zoom` over which the layer fades in
    pub fade_range: f64,
    pub max_alpha: f64,
}

impl LayerThreshold {
    pub const fn new(min_zoom: f64, fade_range: f64, max_alpha: f64) -> Self {
        Self {
            min_zoom,
            fade_range,
            max_alpha,
        }
    }

    /// Alpha for the given zoom, or `None` when the layer is gated off.
    pub fn alpha_at(&self, zoom: f64) -> Option<f64> {
        if zoom < self.min_zoom {
            return None;
        }
        let ramp = if self.fade_range <= 0.0 {
            1.0
        } else {
            ((zoom - self.min_zoom) / self.fade_range).clamp(0.0, 1.0)
        };
        Some(ramp * self.max_alpha)
    }
}

impl Default for LayerThreshold {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

/// Population cutoff for place labels, relaxed as the zoom grows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceRankConfig {
    /// Minimum population shown right at the place-label threshold
    pub start_population: f64,
    /// Zoom distance over which the cutoff halves
    pub halving_zoom: f64,
    /// Zoom from which every place is labeled
    pub show_all_zoom: f64,
}

impl Default for PlaceRankConfig {
    fn default() -> Self {
        Self {
            start_population: 5_000_000.0,
            halving_zoom: 0.5,
            show_all_zoom: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerVisibilityConfig {
    pub land: LayerThreshold,
    pub lakes: LayerThreshold,
    pub country_borders: LayerThreshold,
    pub subdivision_borders: LayerThreshold,
    pub country_labels: LayerThreshold,
    pub subdivision_labels: LayerThreshold,
    pub place_labels: LayerThreshold,
    pub place_rank: PlaceRankConfig,
}

impl Default for LayerVisibilityConfig {
    fn default() -> Self {
        Self {
            land: LayerThreshold::new(0.0, 0.0, 1.0),
            lakes: LayerThreshold::new(1.5, 1.0, 1.0),
            country_borders: LayerThreshold::new(0.0, 0.0, 0.6),
            subdivision_borders: LayerThreshold::new(3.0, 1.5, 0.45),
            country_labels: LayerThreshold::new(2.0, 1.0, 0.8),
            subdivision_labels: LayerThreshold::new(4.0, 1.5, 0.65),
            place_labels: LayerThreshold::new(4.5, 1.5, 0.75),
            place_rank: PlaceRankConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hit_radius_px: f64,
    pub hover_offset_px: f64,
    pub notification_ttl_secs: f64,
    pub max_recent_changes: usize,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hit_radius_px: constants::HIT_RADIUS_PX,
            hover_offset_px: constants::HOVER_OVERLAY_OFFSET_PX,
            notification_ttl_secs: 4.0,
            max_recent_changes: constants::MAX_RECENT_CHANGES,
        }
    }
}

/// Intervals of the external data feeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub peers_secs: f64,
    pub node_info_secs: f64,
    pub system_secs: f64,
    pub changes_secs: f64,
    pub request_timeout_secs: f64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            peers_secs: 10.0,
            node_info_secs: 15.0,
            system_secs: 2.0,
            changes_secs: 5.0,
            request_timeout_secs: 8.0,
        }
    }
}

impl PollingConfig {
    pub fn request_timeout(&self) -> Duration {
        clamped_secs(self.request_timeout_secs, 0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_presets() {
        let balanced = EngineProfile::Balanced.resolve();
        let low = EngineProfile::LowPower.resolve();
        let high = EngineProfile::HighFidelity.resolve();

        assert_eq!(balanced.framerate.target_fps, 60);
        assert_eq!(low.framerate.target_fps, 30);
        assert_eq!(high.framerate.target_fps, 120);
        assert!(low.camera.smoothing > balanced.camera.smoothing);
        assert_eq!(low.lifecycle.glow_radius_px, 0.0);

        let custom = EngineProfile::Custom(high.clone()).resolve();
        assert_eq!(custom, high);
    }

    #[test]
    fn test_huge_durations_are_clamped() {
        let options = EngineOptions::from_json_str(
            r#"{"lifecycle": {"fade_out_secs": 1e300}, "polling": {"request_timeout_secs": 1e300, "peers_secs": 1e300}}"#,
        )
        .unwrap();
        let day = Duration::from_secs(86_400);
        assert_eq!(options.lifecycle.fade_out(), day);
        assert_eq!(options.polling.request_timeout(), day);
        assert_eq!(clamped_secs(-3.0, 0.1), Duration::from_millis(100));
        assert_eq!(clamped_secs(f64::NAN, 0.0), Duration::ZERO);
    }

    #[test]
    fn test_frame_interval() {
        let config = FrameTimingConfig { target_fps: 50 };
        assert_eq!(config.frame_interval(), Duration::from_millis(20));
        let zero = FrameTimingConfig { target_fps: 0 };
        assert_eq!(zero.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_json_override() {
        let options =
            EngineOptions::from_json_str(r#"{ "lifecycle": { "fade_out_secs": 5.0 } }"#).unwrap();
        assert_eq!(options.lifecycle.fade_out_secs, 5.0);
        assert_eq!(options.lifecycle.fade_in_secs, 0.8);
        assert_eq!(options.camera, CameraConfig::default());

        assert!(EngineOptions::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_layer_threshold_alpha() {
        let gate = LayerThreshold::new(2.0, 2.0, 0.8);
        assert_eq!(gate.alpha_at(1.9), None);
        assert_eq!(gate.alpha_at(2.0), Some(0.0));
        assert!((gate.alpha_at(3.0).unwrap() - 0.4).abs() < 1e-12);
        assert!((gate.alpha_at(10.0).unwrap() - 0.8).abs() < 1e-12);

        let instant = LayerThreshold::new(0.0, 0.0, 1.0);
        assert_eq!(instant.alpha_at(0.5), Some(1.0));
    }
}
