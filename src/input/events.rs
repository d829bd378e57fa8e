use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Backend-neutral input, in canvas pixels with the origin at the top-left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMove { position: Point },
    /// Pointer left the canvas; ends any hover
    PointerLeave,
    /// Press and release without dragging
    Click { position: Point, button: MouseButton },
    DoubleClick { position: Point },
    DragStart { position: Point },
    /// Pointer movement since the previous drag event
    Drag { delta: Point },
    DragEnd,
    /// Wheel movement in notches; positive zooms in
    Scroll { delta: f64, position: Point },
    KeyPress { key: KeyCode, modifiers: KeyModifiers },
    Resize { width: f64, height: f64 },
}

/// Keys the map reacts to; everything else arrives as `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Plus,
    Minus,
    Home,
    Escape,
    Other(u32),
}

impl KeyCode {
    pub fn is_arrow(&self) -> bool {
        matches!(
            self,
            KeyCode::ArrowUp | KeyCode::ArrowDown | KeyCode::ArrowLeft | KeyCode::ArrowRight
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    /// Arrow keys pan further while held
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    /// Pins and unpins nodes
    Left,
    Right,
    Middle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys() {
        assert!(KeyCode::ArrowLeft.is_arrow());
        assert!(!KeyCode::Home.is_arrow());
        assert!(!KeyCode::Other(32).is_arrow());
    }

    #[test]
    fn test_events_serialize_for_replay() {
        let events = vec![
            InputEvent::PointerMove {
                position: Point::new(10.0, 20.0),
            },
            InputEvent::Scroll {
                delta: -1.0,
                position: Point::new(0.0, 0.0),
            },
            InputEvent::KeyPress {
                key: KeyCode::Plus,
                modifiers: KeyModifiers::default(),
            },
        ];
        let json = serde_json::to_string(&events).unwrap();
        let back: Vec<InputEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events);
    }
}
