//! # peermap
//!
//! Animated world map of a node's live peer connections.
//!
//! Peers arrive as periodic snapshots from a dashboard backend. The engine
//! reconciles them into animated map entities, projects them onto a
//! horizontally wrapping Web-Mercator canvas over Natural Earth style
//! geometry, and lets the user pan, zoom, hover and pin peers. Rendering is
//! recorded into backend-agnostic draw commands; an egui painter backend is
//! provided behind the `egui` feature, and a tokio polling worker with an
//! HTTP provider behind `tokio-runtime`.

pub mod animation;
pub mod core;
pub mod feed;
pub mod input;
pub mod layers;
pub mod nodes;
pub mod prelude;
pub mod rendering;
pub mod spatial;

#[cfg(feature = "egui")]
pub mod ui;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    clock::{Clock, ManualClock, SystemClock},
    config::{EngineOptions, EngineProfile},
    geo::{LatLng, Point},
    map::{ConnectionStatus, FrameStats, PeerMap},
    viewport::{Camera, Viewport, ViewportSize},
};

pub use feed::provider::{DataProvider, FeedMessage, PeerRequest};

#[cfg(feature = "tokio-runtime")]
pub use feed::{http::HttpProvider, worker::FeedHandle};

pub use input::{events::InputEvent, handler::InputHandler, selection::Selection};

pub use layers::{geometry::GeometryLayer, manager::LayerManager, LayerKind};

pub use nodes::{
    manager::NodeManager,
    snapshot::{PeerId, PeerRecord, PeerSnapshot},
};

pub use rendering::context::{DrawCommand, RenderContext, Rgba};

pub use spatial::index::HitIndex;

#[cfg(feature = "egui")]
pub use ui::widget::{MapView, PeerMapUiExt};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "tokio-runtime")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Unknown network type: {0}")]
    UnknownNetwork(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

pub type Error = MapError;
