use crate::{core::constants::MAX_LATITUDE, MapError, Result};
use serde::{Deserialize, Serialize};

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Like [`LatLng::new`], rejecting anything [`LatLng::is_valid`] refuses
    pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
        let lat_lng = Self::new(lat, lng);
        if lat_lng.is_valid() {
            Ok(lat_lng)
        } else {
            Err(MapError::InvalidCoordinates(format!("({lat}, {lng})")))
        }
    }

    /// Finite, with latitude in `[-90, 90]` and longitude in `[-180, 180]`
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Wraps longitude into [-180, 180]. Positive inputs landing on the
    /// antimeridian stay at 180, negative ones at -180.
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
        if wrapped == -180.0 && lng > 0.0 {
            180.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the band the Mercator projection is evaluated on
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Returns a copy safe to feed into the projection
    pub fn clamped(&self) -> Self {
        Self::new(Self::clamp_lat(self.lat), self.lng)
    }

    /// The same point shifted by whole copies of the world
    pub fn shifted(&self, wrap: i32) -> Self {
        Self::new(self.lat, self.lng + 360.0 * wrap as f64)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Screen pixels or pan-plane coordinates, depending on context
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
