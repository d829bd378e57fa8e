pub mod events;
pub mod handler;
pub mod selection;

// Re-export the essential types
pub use events::{EventHandled, InputEvent, KeyCode, KeyModifiers, MouseButton};
pub use handler::{Action, InputHandler};
pub use selection::{Emphasis, HoverOverlay, PinnedOverlay, Selection};
