use crate::core::{geo::Point, viewport::ViewportSize};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen pixels, used for clip culling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// The whole canvas
    pub fn from_viewport(size: &ViewportSize) -> Self {
        Self::from_coords(0.0, 0.0, size.width, size.height)
    }

    /// Smallest rectangle holding every point, `None` for an empty input
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |mut bounds, point| {
            bounds.min.x = bounds.min.x.min(point.x);
            bounds.min.y = bounds.min.y.min(point.y);
            bounds.max.x = bounds.max.x.max(point.x);
            bounds.max.y = bounds.max.y.max(point.y);
            bounds
        }))
    }

    /// Touching edges count as intersecting
    pub fn intersects(&self, other: &Bounds) -> bool {
        other.max.x >= self.min.x
            && other.min.x <= self.max.x
            && other.max.y >= self.min.y
            && other.min.y <= self.max.y
    }

    /// Grown by `amount` on every side
    pub fn expanded(&self, amount: f64) -> Bounds {
        Self::from_coords(
            self.min.x - amount,
            self.min.y - amount,
            self.max.x + amount,
            self.max.y + amount,
        )
    }
}
