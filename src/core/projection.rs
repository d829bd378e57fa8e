//! Web-Mercator projection between geographic coordinates, the normalized
//! unit square, and screen pixels.
//!
//! Three coordinate spaces are involved:
//!
//! * geographic `(lng, lat)` in degrees,
//! * the normalized plane `(u, v)` where one copy of the world covers
//!   `[0, 1] x [0, 1]` (`v` grows southwards),
//! * the *pan plane*: normalized coordinates re-centered on the world center
//!   and scaled so one world copy is `viewport.width` units wide. Camera pan
//!   offsets live in this space, so they stay meaningful across zoom changes.
//!
//! Screen pixels are obtained from the pan plane by subtracting the camera
//! pan, multiplying by the zoom and offsetting by half the viewport.

use crate::core::{
    geo::{LatLng, Point},
    viewport::{Camera, ViewportSize},
};
use std::f64::consts::{FRAC_PI_4, PI};

/// Maps geographic coordinates to the normalized unit square.
///
/// Latitude must already be clamped to the open `(-90, 90)` interval; callers
/// use [`LatLng::clamp_lat`] for that.
pub fn forward(lng: f64, lat: f64) -> (f64, f64) {
    let u = (lng + 180.0) / 360.0;
    let mercator_y = (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    let v = 0.5 - mercator_y / (2.0 * PI);
    (u, v)
}

/// Exact algebraic inverse of [`forward`].
pub fn inverse(u: f64, v: f64) -> (f64, f64) {
    let lng = u * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * v)).sinh().atan().to_degrees();
    (lng, lat)
}

/// Projects a geographic coordinate into the pan plane.
pub fn to_plane(lat_lng: &LatLng, viewport: &ViewportSize) -> Point {
    let (u, v) = forward(lat_lng.lng, lat_lng.lat);
    Point::new((u - 0.5) * viewport.width, (v - 0.5) * viewport.width)
}

/// Inverse of [`to_plane`].
pub fn from_plane(plane: &Point, viewport: &ViewportSize) -> LatLng {
    let u = plane.x / viewport.width + 0.5;
    let v = plane.y / viewport.width + 0.5;
    let (lng, lat) = inverse(u, v);
    LatLng::new(lat, lng)
}

/// Converts a pan-plane point to screen pixels for the given camera.
pub fn plane_to_screen(plane: &Point, camera: &Camera, viewport: &ViewportSize) -> Point {
    Point::new(
        viewport.width / 2.0 + (plane.x - camera.x) * camera.zoom,
        viewport.height / 2.0 + (plane.y - camera.y) * camera.zoom,
    )
}

/// Converts screen pixels back into the pan plane for the given camera.
pub fn screen_to_plane(screen: &Point, camera: &Camera, viewport: &ViewportSize) -> Point {
    Point::new(
        (screen.x - viewport.width / 2.0) / camera.zoom + camera.x,
        (screen.y - viewport.height / 2.0) / camera.zoom + camera.y,
    )
}

/// Composes [`forward`] with the camera transform.
pub fn to_screen(lng: f64, lat: f64, camera: &Camera, viewport: &ViewportSize) -> Point {
    let plane = to_plane(&LatLng::new(lat, lng), viewport);
    plane_to_screen(&plane, camera, viewport)
}

/// Inverse of [`to_screen`]. The returned longitude is not wrapped, so a
/// point on a repeated world copy yields a longitude outside `[-180, 180]`.
pub fn to_world(screen_x: f64, screen_y: f64, camera: &Camera, viewport: &ViewportSize) -> LatLng {
    let plane = screen_to_plane(&Point::new(screen_x, screen_y), camera, viewport);
    from_plane(&plane, viewport)
}
