pub mod widget;

pub use widget::{glow_layers, paint_commands, MapView, PeerMapUiExt};
