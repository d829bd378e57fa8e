use crate::{
    core::{
        geo::Point,
        viewport::{Viewport, ViewportSize},
    },
    input::{
        events::{EventHandled, InputEvent, KeyCode, KeyModifiers, MouseButton},
        selection::Selection,
    },
    nodes::snapshot::PeerId,
    spatial::index::HitIndex,
};

const SHIFT_PAN_MULTIPLIER: f64 = 4.0;

/// Selection changes an input event asks the map to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Hover(Option<PeerId>),
    /// Pin and recenter on a node
    Pin(PeerId),
    ClearPin,
}

/// What the handler needs to see and move for one event
pub struct InputTargets<'a> {
    pub viewport: &'a mut Viewport,
    pub selection: &'a Selection,
    pub hits: &'a HitIndex,
    pub hit_radius: f64,
}

/// Translates raw input into camera operations and selection actions.
///
/// Camera changes are applied directly to the viewport; selection changes
/// are returned so the map can resolve them against its node set.
#[derive(Debug, Default)]
pub struct InputHandler {
    dragging: bool,
    pointer: Option<Point>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Last pointer position over the canvas
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        targets: InputTargets<'_>,
        actions: &mut Vec<Action>,
    ) -> EventHandled {
        let InputTargets {
            viewport,
            selection,
            hits,
            hit_radius,
        } = targets;

        match event {
            InputEvent::PointerMove { position } => {
                self.pointer = Some(*position);
                if !self.dragging {
                    let hovered = hits.nearest(position, hit_radius).map(|hit| hit.id);
                    if hovered != selection.hovered() {
                        actions.push(Action::Hover(hovered));
                    }
                }
                EventHandled::Handled
            }
            InputEvent::PointerLeave => {
                self.pointer = None;
                if selection.hovered().is_some() {
                    actions.push(Action::Hover(None));
                }
                EventHandled::Handled
            }
            InputEvent::DragStart { position } => {
                self.dragging = true;
                self.pointer = Some(*position);
                if selection.hovered().is_some() {
                    actions.push(Action::Hover(None));
                }
                EventHandled::Handled
            }
            InputEvent::Drag { delta } => {
                if !self.dragging {
                    self.dragging = true;
                }
                viewport.pan(*delta);
                EventHandled::Handled
            }
            InputEvent::DragEnd => {
                self.dragging = false;
                EventHandled::Handled
            }
            InputEvent::Click {
                position,
                button: MouseButton::Left,
            } => {
                match hits.nearest(position, hit_radius) {
                    Some(hit) => actions.push(Action::Pin(hit.id)),
                    None if selection.pinned().is_some() => actions.push(Action::ClearPin),
                    None => {}
                }
                EventHandled::Handled
            }
            InputEvent::Click { .. } => EventHandled::NotHandled,
            InputEvent::DoubleClick { position } => {
                viewport.zoom_toward(*position, 2.0);
                EventHandled::Handled
            }
            InputEvent::Scroll { delta, position } => {
                if *delta == 0.0 || !delta.is_finite() {
                    return EventHandled::NotHandled;
                }
                let factor = viewport.config().wheel_zoom_factor.powf(*delta);
                viewport.zoom_toward(*position, factor);
                EventHandled::Handled
            }
            InputEvent::KeyPress { key, modifiers } => {
                self.handle_key(*key, *modifiers, viewport, selection, actions)
            }
            InputEvent::Resize { width, height } => {
                let inset = viewport.size().bottom_inset;
                viewport.set_size(ViewportSize::new(*width, *height).with_bottom_inset(inset));
                EventHandled::Handled
            }
        }
    }

    fn handle_key(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
        viewport: &mut Viewport,
        selection: &Selection,
        actions: &mut Vec<Action>,
    ) -> EventHandled {
        let mut step = viewport.config().keyboard_pan_px;
        if modifiers.shift && key.is_arrow() {
            step *= SHIFT_PAN_MULTIPLIER;
        }
        let key_zoom = viewport.config().wheel_zoom_factor.powi(3);
        match key {
            // Panning drags the map, so the view moves against the delta
            KeyCode::ArrowLeft => viewport.pan(Point::new(step, 0.0)),
            KeyCode::ArrowRight => viewport.pan(Point::new(-step, 0.0)),
            KeyCode::ArrowUp => viewport.pan(Point::new(0.0, step)),
            KeyCode::ArrowDown => viewport.pan(Point::new(0.0, -step)),
            KeyCode::Plus => viewport.zoom_center(key_zoom),
            KeyCode::Minus => viewport.zoom_center(1.0 / key_zoom),
            KeyCode::Home => viewport.reset(),
            KeyCode::Escape => {
                if selection.pinned().is_none() {
                    return EventHandled::NotHandled;
                }
                actions.push(Action::ClearPin);
            }
            KeyCode::Other(_) => return EventHandled::NotHandled,
        }
        EventHandled::Handled
    }
}
