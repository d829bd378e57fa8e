//! Prelude module for common peermap types and traits
//!
//! Re-exports the types most embedders need, for `use peermap::prelude::*;`

pub use crate::core::{
    clock::{Clock, ManualClock, SystemClock},
    config::{
        CameraConfig, EngineOptions, EngineProfile, FrameTimingConfig, InteractionConfig,
        LayerVisibilityConfig, LifecycleConfig, PollingConfig,
    },
    geo::{LatLng, Point},
    map::{ConnectionStatus, FramePacer, FrameStats, Notification, NotificationKind, PeerMap},
    viewport::{Camera, Viewport, ViewportSize},
};

pub use crate::feed::{
    provider::{DataProvider, FeedMessage, PeerRequest},
    schedule::FeedKind,
};

#[cfg(feature = "tokio-runtime")]
pub use crate::feed::{
    http::HttpProvider,
    worker::{FeedHandle, WorkerCommand},
};

pub use crate::input::{
    events::{EventHandled, InputEvent, KeyCode, KeyModifiers, MouseButton},
    handler::{Action, InputHandler},
    selection::{HoverOverlay, PinnedOverlay, Selection},
};

pub use crate::layers::{
    base::{LayerKind, MapLayer},
    geometry::{GeometryLayer, LayerLoadReport},
    manager::LayerManager,
};

pub use crate::nodes::{
    entity::{NodeEntity, NodePhase},
    manager::{NodeManager, ReconcileReport},
    network::{Direction, LocationStatus, NetworkType},
    snapshot::{ChangeEvent, NodeInfo, PeerId, PeerRecord, PeerSnapshot, SystemStats},
};

pub use crate::rendering::context::{DrawCommand, RenderContext, Rgba};

pub use crate::spatial::index::HitIndex;

#[cfg(feature = "egui")]
pub use crate::ui::widget::{MapView, PeerMapUiExt};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};

#[cfg(feature = "tokio-runtime")]
pub use futures::Future;
