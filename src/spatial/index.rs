use crate::{
    core::{
        geo::Point,
        projection,
        viewport::{Camera, ViewportSize},
    },
    nodes::{entity::NodeEntity, snapshot::PeerId},
};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A projected node copy at one wrap offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCandidate {
    pub id: PeerId,
    pub screen: Point,
    pub wrap: i32,
}

// --- rstar integration -------------------------------------------------------------------------

impl RTreeObject for HitCandidate {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.screen.x, self.screen.y])
    }
}

impl PointDistance for HitCandidate {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.screen.x - point[0];
        let dy = self.screen.y - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over the screen positions of alive nodes, across every visible
/// world copy. Rebuilt whenever the camera or the node set changes.
#[derive(Default)]
pub struct HitIndex {
    rtree: RTree<HitCandidate>,
}

impl HitIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects every node at every wrap offset and bulk-loads the tree
    pub fn build<'a, I>(nodes: I, camera: &Camera, size: &ViewportSize, wrap_offsets: &[i32]) -> Self
    where
        I: IntoIterator<Item = &'a NodeEntity>,
    {
        let mut candidates = Vec::new();
        for node in nodes {
            let position = node.position.clamped();
            for &wrap in wrap_offsets {
                let shifted = position.shifted(wrap);
                let screen = projection::to_screen(shifted.lng, shifted.lat, camera, size);
                if screen.is_finite() {
                    candidates.push(HitCandidate {
                        id: node.id,
                        screen,
                        wrap,
                    });
                }
            }
        }
        Self {
            rtree: RTree::bulk_load(candidates),
        }
    }

    /// Nearest candidate no farther than `radius` pixels
    pub fn nearest(&self, point: &Point, radius: f64) -> Option<&HitCandidate> {
        let query = [point.x, point.y];
        self.rtree
            .nearest_neighbor(&query)
            .filter(|candidate| candidate.distance_2(&query) <= radius * radius)
    }

    /// All candidates within `radius` pixels
    pub fn query_radius(&self, point: &Point, radius: f64) -> Vec<&HitCandidate> {
        self.rtree
            .locate_within_distance([point.x, point.y], radius * radius)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}
