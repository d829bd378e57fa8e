pub mod bounds;
pub mod clock;
pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod projection;
pub mod viewport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EngineOptions, EngineProfile};
pub use map::{ConnectionStatus, FramePacer, FrameStats, PeerMap};
