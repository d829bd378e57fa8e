use crate::core::{
    config::CameraConfig,
    constants::MAX_LATITUDE,
    geo::{LatLng, Point},
    projection,
};
use serde::{Deserialize, Serialize};

/// Pan offset and zoom factor used to convert plane coordinates to pixels.
///
/// `x`/`y` are pan-plane coordinates (see [`projection`]) of the point shown
/// at the center of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Camera {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

/// Canvas dimensions in pixels.
///
/// `bottom_inset` is the height currently covered by a collapsible bottom
/// panel; it only affects where recentering places a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
    pub bottom_inset: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            bottom_inset: 0.0,
        }
    }

    pub fn with_bottom_inset(mut self, inset: f64) -> Self {
        self.bottom_inset = inset.clamp(0.0, self.height.max(0.0));
        self
    }

    /// Height not covered by the bottom panel
    pub fn unobstructed_height(&self) -> f64 {
        (self.height - self.bottom_inset).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Owns the current and target camera and smooths between them.
///
/// Every mutation re-applies the vertical clamp, so a camera read by the
/// renderer never exposes space beyond the ±85° edge of the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    current: Camera,
    target: Camera,
    size: ViewportSize,
    config: CameraConfig,
}

impl Viewport {
    /// Creates a new viewport showing the whole world
    pub fn new(size: ViewportSize, config: CameraConfig) -> Self {
        let home = Camera::new(0.0, 0.0, config.reset_zoom);
        let home = clamp_camera(home, &size, &config);
        Self {
            current: home,
            target: home,
            size,
            config,
        }
    }

    pub fn current(&self) -> &Camera {
        &self.current
    }

    pub fn target(&self) -> &Camera {
        &self.target
    }

    pub fn size(&self) -> &ViewportSize {
        &self.size
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Sets the viewport size, keeping the bottom inset within the new height
    pub fn set_size(&mut self, size: ViewportSize) {
        let inset = size.bottom_inset;
        self.size = size.with_bottom_inset(inset);
        self.reclamp();
    }

    pub fn set_bottom_inset(&mut self, inset: f64) {
        self.size = self.size.with_bottom_inset(inset);
    }

    /// Whether current and target have converged
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Advances the current camera one smoothing step toward the target.
    /// Returns `true` when the current camera moved.
    pub fn step(&mut self) -> bool {
        let before = self.current;
        let s = self.config.smoothing.clamp(0.0, 1.0);
        let eps = self.config.snap_epsilon;

        self.current.x = approach(self.current.x, self.target.x, s, eps);
        self.current.y = approach(self.current.y, self.target.y, s, eps);
        self.current.zoom = approach(self.current.zoom, self.target.zoom, s, eps);

        self.normalize_wrap();
        self.current = clamp_camera(self.current, &self.size, &self.config);
        self.current != before
    }

    /// Drags the map by a screen-space delta. Both cameras move so the map
    /// tracks the pointer one to one.
    pub fn pan(&mut self, delta: Point) {
        let dx = delta.x / self.current.zoom;
        let dy = delta.y / self.current.zoom;
        self.current.x -= dx;
        self.current.y -= dy;
        self.target.x -= dx;
        self.target.y -= dy;
        self.normalize_wrap();
        self.reclamp();
    }

    /// Rescales the target zoom by `factor`, keeping the geographic point
    /// under `screen_point` fixed once the camera settles.
    pub fn zoom_toward(&mut self, screen_point: Point, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let anchor = projection::screen_to_plane(&screen_point, &self.current, &self.size);
        let new_zoom = (self.target.zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        if (new_zoom - self.target.zoom).abs() < f64::EPSILON {
            return;
        }

        self.target.zoom = new_zoom;
        self.target.x = anchor.x - (screen_point.x - self.size.width / 2.0) / new_zoom;
        self.target.y = anchor.y - (screen_point.y - self.size.height / 2.0) / new_zoom;
        self.target = clamp_camera(self.target, &self.size, &self.config);
    }

    /// Zooms about the center of the viewport
    pub fn zoom_center(&mut self, factor: f64) {
        let center = Point::new(self.size.width / 2.0, self.size.height / 2.0);
        self.zoom_toward(center, factor);
    }

    /// Animates back to the whole-world view
    pub fn reset(&mut self) {
        let home = Camera::new(0.0, 0.0, self.config.reset_zoom);
        self.target = clamp_camera(home, &self.size, &self.config);
    }

    /// Moves both cameras immediately
    pub fn jump_to(&mut self, camera: Camera) {
        let camera = clamp_camera(camera, &self.size, &self.config);
        self.current = camera;
        self.target = camera;
    }

    /// Starts an animated move so that `lat_lng` is recentered inside the
    /// area not covered by the bottom panel. Returns the chosen zoom.
    pub fn focus_on(&mut self, lat_lng: &LatLng) -> f64 {
        let plane = projection::to_plane(&lat_lng.clamped(), &self.size);
        let zoom = self.recenter_zoom(&plane);

        // Take the copy of the node nearest to what is on screen now
        let w = self.size.width;
        let wraps = ((self.current.x - plane.x) / w).round();
        let x = plane.x + wraps * w;

        let wanted = Camera::new(x, plane.y + self.size.bottom_inset / (2.0 * zoom), zoom);
        self.target = clamp_camera(wanted, &self.size, &self.config);
        zoom
    }

    /// Smallest zoom at or above the recenter baseline at which `plane`
    /// can be shown inside the unobstructed area once the vertical clamp is
    /// applied, limited to the maximum zoom.
    pub fn recenter_zoom(&self, plane: &Point) -> f64 {
        let max = self.config.max_zoom;
        let mut low = self.config.recenter_baseline_zoom.clamp(self.config.min_zoom, max);
        if self.recenter_fits(plane, low) {
            return low;
        }

        let step = self.config.recenter_step.max(1e-3);
        let mut high = low;
        loop {
            if high >= max {
                if !self.recenter_fits(plane, max) {
                    return max;
                }
                high = max;
                break;
            }
            low = high;
            high = (high + step).min(max);
            if self.recenter_fits(plane, high) {
                break;
            }
        }

        // `low` does not fit and `high` does; narrow the bracket
        while high - low > 1e-3 {
            let mid = (low + high) / 2.0;
            if self.recenter_fits(plane, mid) {
                high = mid;
            } else {
                low = mid;
            }
        }
        high
    }

    fn recenter_fits(&self, plane: &Point, zoom: f64) -> bool {
        let wanted = Camera::new(plane.x, plane.y + self.size.bottom_inset / (2.0 * zoom), zoom);
        let camera = clamp_camera(wanted, &self.size, &self.config);
        let screen_y = self.size.height / 2.0 + (plane.y - camera.y) * zoom;
        let margin = self.config.recenter_margin_px;
        screen_y >= margin && screen_y <= self.size.unobstructed_height() - margin
    }

    /// Horizontal world copies (as multiples of 360° longitude) whose
    /// projection overlaps the viewport plus the wrap margin. Never empty.
    pub fn wrap_offsets(&self) -> Vec<i32> {
        wrap_offsets(&self.current, &self.size, self.config.wrap_margin_px)
    }

    fn normalize_wrap(&mut self) {
        let w = self.size.width;
        if w <= 0.0 {
            return;
        }
        let shift = ((self.current.x + w / 2.0) / w).floor();
        if shift != 0.0 {
            self.current.x -= shift * w;
            self.target.x -= shift * w;
        }
    }

    fn reclamp(&mut self) {
        self.current = clamp_camera(self.current, &self.size, &self.config);
        self.target = clamp_camera(self.target, &self.size, &self.config);
    }
}

/// Exponential approach that snaps once within `eps`
fn approach(current: f64, target: f64, smoothing: f64, eps: f64) -> f64 {
    let next = current + (target - current) * smoothing;
    if (target - next).abs() <= eps {
        target
    } else {
        next
    }
}

/// Applies the zoom limits and the vertical travel invariant.
///
/// At zoom <= 1 the vertical pan is locked to the center. Above it the pan
/// is clamped so the ±85° edges of the world never leave empty space above
/// or below; when the world is still shorter than the viewport it stays
/// centered.
pub fn clamp_camera(camera: Camera, size: &ViewportSize, config: &CameraConfig) -> Camera {
    let zoom = camera.zoom.clamp(config.min_zoom, config.max_zoom);
    let mut y = camera.y;

    if zoom <= 1.0 || size.is_empty() {
        y = 0.0;
    } else {
        let top = projection::to_plane(&LatLng::new(MAX_LATITUDE, 0.0), size).y;
        let bottom = projection::to_plane(&LatLng::new(-MAX_LATITUDE, 0.0), size).y;
        let half_height = size.height / 2.0 / zoom;
        let lo = top + half_height;
        let hi = bottom - half_height;
        y = if lo > hi { 0.0 } else { y.clamp(lo, hi) };
    }

    Camera::new(camera.x, y, zoom)
}

/// See [`Viewport::wrap_offsets`].
pub fn wrap_offsets(camera: &Camera, size: &ViewportSize, margin_px: f64) -> Vec<i32> {
    let w = size.width;
    if w <= 0.0 || camera.zoom <= 0.0 {
        return vec![0];
    }
    let half_view = (w / 2.0 + margin_px.max(0.0)) / camera.zoom;
    let left = camera.x - half_view;
    let right = camera.x + half_view;

    let first = ((left + w / 2.0) / w).floor() as i32;
    let last = ((right + w / 2.0) / w).floor() as i32;
    if last < first {
        return vec![((camera.x + w / 2.0) / w).floor() as i32];
    }
    (first..=last).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(ViewportSize::new(1200.0, 700.0), CameraConfig::default())
    }

    fn settle(viewport: &mut Viewport) {
        for _ in 0..500 {
            if !viewport.step() {
                break;
            }
        }
    }

    #[test]
    fn test_viewport_creation() {
        let viewport = viewport();
        assert_eq!(viewport.current().zoom, 1.0);
        assert_eq!(viewport.current(), viewport.target());
        assert!(viewport.is_settled());
    }

    #[test]
    fn test_vertical_pan_locked_at_low_zoom() {
        let mut viewport = viewport();
        viewport.pan(Point::new(35.0, 240.0));
        assert_eq!(viewport.current().y, 0.0);
        assert_eq!(viewport.target().y, 0.0);
        // Horizontal travel is free
        assert!(viewport.current().x < 0.0);
    }

    #[test]
    fn test_vertical_clamp_at_high_zoom() {
        let mut viewport = viewport();
        viewport.jump_to(Camera::new(0.0, -10_000.0, 4.0));
        let camera = *viewport.current();
        let size = *viewport.size();

        // The top edge of the world sits exactly at the top of the screen
        let top = projection::to_screen(0.0, MAX_LATITUDE, &camera, &size);
        assert!(top.y.abs() < 1e-6);

        viewport.jump_to(Camera::new(0.0, 10_000.0, 4.0));
        let camera = *viewport.current();
        let bottom = projection::to_screen(0.0, -MAX_LATITUDE, &camera, &size);
        assert!((bottom.y - size.height).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_toward_keeps_point_fixed() {
        let mut viewport = viewport();
        let cursor = Point::new(900.0, 300.0);
        let before = projection::to_world(cursor.x, cursor.y, viewport.current(), viewport.size());

        viewport.zoom_toward(cursor, 2.0);
        settle(&mut viewport);
        assert!((viewport.current().zoom - 2.0).abs() < 1e-9);

        let after = projection::to_world(cursor.x, cursor.y, viewport.current(), viewport.size());
        assert!((LatLng::wrap_lng(after.lng) - LatLng::wrap_lng(before.lng)).abs() < 1e-3);
        assert!((after.lat - before.lat).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = viewport();
        viewport.zoom_center(1e6);
        assert_eq!(viewport.target().zoom, CameraConfig::default().max_zoom);
        viewport.zoom_center(1e-9);
        assert_eq!(viewport.target().zoom, CameraConfig::default().min_zoom);
        // Invalid factors are ignored
        viewport.zoom_center(f64::NAN);
        viewport.zoom_center(-2.0);
        assert_eq!(viewport.target().zoom, CameraConfig::default().min_zoom);
    }

    #[test]
    fn test_step_converges_and_snaps() {
        let mut viewport = viewport();
        viewport.zoom_center(3.0);
        assert!(!viewport.is_settled());
        assert!(viewport.step());
        settle(&mut viewport);
        assert!(viewport.is_settled());
        assert!(!viewport.step());
    }

    #[test]
    fn test_reset() {
        let mut viewport = viewport();
        viewport.jump_to(Camera::new(300.0, 50.0, 6.0));
        viewport.reset();
        settle(&mut viewport);
        assert_eq!(*viewport.current(), Camera::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_pan_wraps_horizontally() {
        let mut viewport = viewport();
        viewport.pan(Point::new(-1300.0, 0.0));
        let x = viewport.current().x;
        assert!(x >= -600.0 && x < 600.0, "x = {x}");
        assert_eq!(viewport.current().x, viewport.target().x);
    }

    #[test]
    fn test_wrap_offsets_cover_viewport() {
        let size = ViewportSize::new(1200.0, 700.0);
        for zoom in [1.0, 1.3, 2.0, 7.5, 40.0] {
            for x in [-599.0, -300.0, 0.0, 250.0, 599.0] {
                let camera = Camera::new(x, 0.0, zoom);
                let offsets = wrap_offsets(&camera, &size, 64.0);
                assert!(!offsets.is_empty());

                let world_px = size.width * zoom;
                let limit = (size.width / world_px).ceil() as usize + 2;
                assert!(offsets.len() <= limit, "zoom {zoom}: {offsets:?}");

                // Union of copies spans the whole screen width
                let first = *offsets.first().unwrap();
                let last = *offsets.last().unwrap();
                let left = projection::to_screen(-180.0 + 360.0 * first as f64, 0.0, &camera, &size).x;
                let right = projection::to_screen(180.0 + 360.0 * last as f64, 0.0, &camera, &size).x;
                assert!(left <= 0.0 && right >= size.width, "zoom {zoom} x {x}");
            }
        }
    }

    #[test]
    fn test_wrap_offsets_degenerate_size() {
        let camera = Camera::default();
        assert_eq!(wrap_offsets(&camera, &ViewportSize::new(0.0, 0.0), 64.0), vec![0]);
    }

    #[test]
    fn test_recenter_zoom_baseline_for_equatorial_point() {
        let viewport = viewport();
        let plane = projection::to_plane(&LatLng::new(0.0, 20.0), viewport.size());
        assert_eq!(viewport.recenter_zoom(&plane), 3.0);
    }

    #[test]
    fn test_recenter_zoom_is_smallest_feasible() {
        let mut viewport = viewport();
        viewport.set_bottom_inset(300.0);
        let plane = projection::to_plane(&LatLng::new(-84.0, 20.0), viewport.size());
        let zoom = viewport.recenter_zoom(&plane);
        assert!(zoom > 3.0);
        assert!(zoom <= CameraConfig::default().max_zoom);
        assert!(viewport.recenter_fits(&plane, zoom));
        assert!(!viewport.recenter_fits(&plane, zoom - 0.01));
    }

    #[test]
    fn test_focus_on_places_node_in_unobstructed_area() {
        let mut viewport = viewport();
        viewport.set_bottom_inset(200.0);
        let target = LatLng::new(40.0, -74.0);
        viewport.focus_on(&target);
        settle(&mut viewport);

        let screen = projection::to_screen(target.lng, target.lat, viewport.current(), viewport.size());
        assert!((screen.x - 600.0).abs() < 1.0);
        assert!(screen.y > 0.0 && screen.y < 500.0);
    }
}
