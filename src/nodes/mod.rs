pub mod entity;
pub mod manager;
pub mod network;
pub mod placement;
pub mod snapshot;

// Re-export the types most callers touch
pub use entity::{NodeEntity, NodePhase, NodeVisual};
pub use manager::{NodeManager, ReconcileReport};
pub use network::{Direction, LocationStatus, NetworkType};
pub use snapshot::{PeerId, PeerRecord, PeerSnapshot};
