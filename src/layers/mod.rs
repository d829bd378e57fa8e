pub mod base;
pub mod geometry;
pub mod manager;

pub use base::{LayerKind, LayerProperties, LayerView, MapLayer};
pub use geometry::{GeometryLayer, LayerLoadReport};
pub use manager::LayerManager;
