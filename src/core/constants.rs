//! Engine-wide constants.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Latitude band the Mercator projection is evaluated on. Beyond it the
/// projection diverges, so inputs are clamped here before projecting.
pub const MAX_LATITUDE: f64 = 85.0;

/// Smallest continuous zoom (one world copy spans the viewport width).
pub const DEFAULT_MIN_ZOOM: f64 = 1.0;

/// Largest continuous zoom.
pub const DEFAULT_MAX_ZOOM: f64 = 40.0;

/// Zoom used when recentering on a selected peer.
pub const RECENTER_BASELINE_ZOOM: f64 = 3.0;

/// Zoom factor applied per mouse wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.15;

/// Fraction of the remaining distance the camera covers each frame.
pub const CAMERA_SMOOTHING: f64 = 0.15;

/// Pixels around the viewport inside which wrap copies still count as visible.
pub const WRAP_MARGIN_PX: f64 = 64.0;

/// Pointer pick radius in screen pixels.
pub const HIT_RADIUS_PX: f64 = 12.0;

/// Offset of the hover overlay from the cursor.
pub const HOVER_OVERLAY_OFFSET_PX: f64 = 14.0;

/// Default frame rate of the render loop.
pub const TARGET_FPS: u32 = 60;

/// Bound on retained connect/disconnect events.
pub const MAX_RECENT_CHANGES: usize = 50;

/// Upper bound on any configured interval or duration, in seconds.
pub const MAX_CONFIGURED_SECS: f64 = 86_400.0;
