//! egui backend: replays the recorded frame and feeds egui input back into
//! the map.

use crate::{
    core::{
        config::EngineOptions,
        geo::Point,
        map::{ConnectionStatus, FramePacer, NotificationKind, PeerMap},
    },
    input::{
        events::{InputEvent, KeyCode, KeyModifiers, MouseButton},
        selection::{HoverOverlay, PinnedOverlay},
    },
    rendering::context::{DrawCommand, RenderContext, TextAnchor},
};
use egui::{
    epaint::Mesh, Align2, Color32, CursorIcon, FontId, Id, Pos2, Rect, Response, Rounding, Sense,
    Shape, Stroke, Ui, Vec2,
};

/// egui points per wheel notch
const SCROLL_NOTCH: f32 = 50.0;
const GLOW_STEPS: usize = 5;

const KEY_BINDINGS: [(egui::Key, KeyCode); 8] = [
    (egui::Key::ArrowUp, KeyCode::ArrowUp),
    (egui::Key::ArrowDown, KeyCode::ArrowDown),
    (egui::Key::ArrowLeft, KeyCode::ArrowLeft),
    (egui::Key::ArrowRight, KeyCode::ArrowRight),
    (egui::Key::Plus, KeyCode::Plus),
    (egui::Key::Minus, KeyCode::Minus),
    (egui::Key::Home, KeyCode::Home),
    (egui::Key::Escape, KeyCode::Escape),
];

/// Persistent view state for showing a [`PeerMap`] inside egui
pub struct MapView {
    pacer: FramePacer,
    context: RenderContext,
    pointer_inside: bool,
    id: Id,
}

impl MapView {
    pub fn new(options: &EngineOptions) -> Self {
        Self {
            pacer: FramePacer::new(&options.framerate),
            context: RenderContext::new(0.0, 0.0),
            pointer_inside: false,
            id: Id::new("peermap"),
        }
    }

    pub fn id(mut self, id: impl Into<Id>) -> Self {
        self.id = id.into();
        self
    }

    /// Lays out the map in the available space
    pub fn show(&mut self, ui: &mut Ui, map: &mut PeerMap) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        self.forward_input(ui, map, rect, &response);

        let now = map.now();
        if self.pacer.should_render(now) {
            map.tick(&mut self.context);
        }
        let painter = ui.painter_at(rect);
        paint_commands(&painter, rect.min, self.context.get_drawing_queue());

        if let Some(overlay) = map.hover_overlay() {
            if map.selection().pinned() != Some(overlay.id) {
                paint_hover_overlay(&painter, rect, &overlay);
            }
        }
        if let Some(overlay) = map.pinned_overlay() {
            self.show_pinned_overlay(ui, map, rect, &overlay);
        }
        paint_status(&painter, rect, map);

        if map.selection().hovered().is_some() && !response.dragged() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        } else if response.dragged() {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        }
        ui.ctx().request_repaint_after(self.pacer.time_until_next(map.now()));
        response
    }

    fn forward_input(&mut self, ui: &Ui, map: &mut PeerMap, rect: Rect, response: &Response) {
        let local = |pos: Pos2| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);

        let size = map.viewport().size();
        if (size.width - rect.width() as f64).abs() > 0.5 || (size.height - rect.height() as f64).abs() > 0.5 {
            map.handle_input(&InputEvent::Resize {
                width: rect.width() as f64,
                height: rect.height() as f64,
            });
        }

        match response.hover_pos() {
            Some(pos) => {
                self.pointer_inside = true;
                map.handle_input(&InputEvent::PointerMove { position: local(pos) });
            }
            None if self.pointer_inside => {
                self.pointer_inside = false;
                map.handle_input(&InputEvent::PointerLeave);
            }
            None => {}
        }

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                map.handle_input(&InputEvent::DragStart { position: local(pos) });
            }
        }
        if response.dragged() {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                map.handle_input(&InputEvent::Drag {
                    delta: Point::new(delta.x as f64, delta.y as f64),
                });
            }
        }
        if response.drag_released() {
            map.handle_input(&InputEvent::DragEnd);
        }

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                map.handle_input(&InputEvent::DoubleClick { position: local(pos) });
            }
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                map.handle_input(&InputEvent::Click {
                    position: local(pos),
                    button: MouseButton::Left,
                });
            }
        }

        if !response.hovered() {
            return;
        }
        let (scroll, modifiers, keys) = ui.input(|i| {
            let keys: Vec<KeyCode> = KEY_BINDINGS
                .iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|(_, code)| *code)
                .collect();
            (i.raw_scroll_delta.y, i.modifiers, keys)
        });
        if scroll.abs() > f32::EPSILON {
            if let Some(pos) = response.hover_pos() {
                map.handle_input(&InputEvent::Scroll {
                    delta: (scroll / SCROLL_NOTCH) as f64,
                    position: local(pos),
                });
            }
        }
        let modifiers = KeyModifiers {
            shift: modifiers.shift,
            ctrl: modifiers.ctrl,
            alt: modifiers.alt,
            meta: modifiers.command,
        };
        for key in keys {
            map.handle_input(&InputEvent::KeyPress { key, modifiers });
        }
    }

    fn show_pinned_overlay(&self, ui: &Ui, map: &mut PeerMap, rect: Rect, overlay: &PinnedOverlay) {
        let anchor = rect.min + Vec2::new(overlay.anchor.x as f32 + 16.0, overlay.anchor.y as f32 - 16.0);
        let far = (rect.max - Vec2::new(260.0, 160.0)).max(rect.min);
        let anchor = anchor.clamp(rect.min, far);
        let id = overlay.id;

        egui::Area::new(self.id.with("pinned"))
            .fixed_pos(anchor)
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(260.0);
                    ui.horizontal(|ui| {
                        ui.strong(&overlay.title);
                        if ui.small_button("x").clicked() {
                            map.clear_selection();
                        }
                    });
                    for line in &overlay.lines {
                        ui.label(line);
                    }
                    ui.separator();
                    ui.horizontal(|ui| {
                        if overlay.can_disconnect && ui.button("Disconnect").clicked() {
                            if let Err(err) = map.request_disconnect(id) {
                                log::warn!("disconnect refused: {err}");
                            }
                        }
                        if overlay.can_ban && ui.button("Ban").clicked() {
                            if let Err(err) = map.request_ban(id) {
                                log::warn!("ban refused: {err}");
                            }
                        }
                    });
                });
            });
    }
}

/// Shorthand for showing a map in a `Ui`
pub trait PeerMapUiExt {
    fn peer_map(&mut self, view: &mut MapView, map: &mut PeerMap) -> Response;
}

impl PeerMapUiExt for Ui {
    fn peer_map(&mut self, view: &mut MapView, map: &mut PeerMap) -> Response {
        view.show(self, map)
    }
}

fn to_pos(origin: Pos2, point: &Point) -> Pos2 {
    Pos2::new(origin.x + point.x as f32, origin.y + point.y as f32)
}

/// Concentric discs approximating a radial falloff, outermost first
pub fn glow_layers(radius: f32, color: Color32) -> Vec<(f32, Color32)> {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    (0..GLOW_STEPS)
        .map(|step| {
            let t = (step + 1) as f32 / GLOW_STEPS as f32;
            let layer_alpha = (a as f32 / GLOW_STEPS as f32).round() as u8;
            (radius * (1.1 - t), Color32::from_rgba_unmultiplied(r, g, b, layer_alpha))
        })
        .collect()
}

/// Replays recorded commands with `origin` as the canvas top-left
pub fn paint_commands(painter: &egui::Painter, origin: Pos2, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::Clear { color } => {
                painter.rect_filled(painter.clip_rect(), Rounding::ZERO, Color32::from(*color));
            }
            DrawCommand::Point { position, style } => {
                let center = to_pos(origin, position);
                painter.circle(
                    center,
                    style.radius,
                    Color32::from(style.fill_color),
                    Stroke::new(style.stroke_width, Color32::from(style.stroke_color)),
                );
            }
            DrawCommand::Ring { center, radius, style } => {
                painter.circle_stroke(
                    to_pos(origin, center),
                    *radius,
                    Stroke::new(style.width, Color32::from(style.color)),
                );
            }
            DrawCommand::Glow { center, radius, color } => {
                let center = to_pos(origin, center);
                for (layer_radius, layer_color) in glow_layers(*radius, Color32::from(*color)) {
                    painter.circle_filled(center, layer_radius, layer_color);
                }
            }
            DrawCommand::Line { points, style } => {
                let points = points.iter().map(|p| to_pos(origin, p)).collect();
                painter.add(Shape::line(
                    points,
                    Stroke::new(style.width, Color32::from(style.color)),
                ));
            }
            DrawCommand::Mesh {
                vertices,
                indices,
                color,
            } => {
                let color = Color32::from(*color);
                let mut mesh = Mesh::default();
                mesh.reserve_vertices(vertices.len());
                mesh.reserve_triangles(indices.len() / 3);
                for vertex in vertices {
                    mesh.colored_vertex(to_pos(origin, vertex), color);
                }
                for triangle in indices.chunks_exact(3) {
                    mesh.add_triangle(triangle[0], triangle[1], triangle[2]);
                }
                painter.add(Shape::mesh(mesh));
            }
            DrawCommand::Text { position, text, style } => {
                let align = match style.anchor {
                    TextAnchor::Center => Align2::CENTER_CENTER,
                    TextAnchor::LeftCenter => Align2::LEFT_CENTER,
                };
                painter.text(
                    to_pos(origin, position),
                    align,
                    text,
                    FontId::proportional(style.size),
                    Color32::from(style.color),
                );
            }
        }
    }
}

fn paint_hover_overlay(painter: &egui::Painter, rect: Rect, overlay: &HoverOverlay) {
    let font = FontId::proportional(12.0);
    let text = std::iter::once(overlay.title.as_str())
        .chain(overlay.lines.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n");
    let text_size = painter
        .layout_no_wrap(text.clone(), font.clone(), Color32::WHITE)
        .size();

    let mut pos = to_pos(rect.min, &overlay.anchor);
    // Keep the box on the canvas
    pos.x = pos.x.min(rect.max.x - text_size.x - 12.0).max(rect.min.x);
    pos.y = pos.y.min(rect.max.y - text_size.y - 12.0).max(rect.min.y);
    let frame = Rect::from_min_size(pos, text_size + Vec2::splat(12.0));

    painter.rect(
        frame,
        Rounding::same(4.0),
        Color32::from_rgba_unmultiplied(16, 20, 32, 235),
        Stroke::new(1.0, Color32::from_gray(70)),
    );
    painter.text(
        pos + Vec2::splat(6.0),
        Align2::LEFT_TOP,
        text,
        font,
        Color32::from_gray(225),
    );
}

fn paint_status(painter: &egui::Painter, rect: Rect, map: &PeerMap) {
    let (label, color) = match map.connection_status() {
        ConnectionStatus::Connecting => ("connecting", Color32::from_rgb(200, 180, 90)),
        ConnectionStatus::Online => ("online", Color32::from_rgb(90, 200, 120)),
        ConnectionStatus::Offline => ("offline", Color32::from_rgb(220, 90, 90)),
    };
    let summary = map.network_summary().total();
    let status = format!(
        "{label}  {} peers ({} in / {} out)",
        summary.total(),
        summary.inbound,
        summary.outbound
    );
    painter.text(
        rect.left_top() + Vec2::new(10.0, 10.0),
        Align2::LEFT_TOP,
        status,
        FontId::monospace(12.0),
        color,
    );

    let mut y = rect.top() + 10.0;
    for notification in map.notifications() {
        let color = match notification.kind {
            NotificationKind::Success => Color32::from_rgb(120, 210, 140),
            NotificationKind::Error => Color32::from_rgb(235, 110, 110),
        };
        let drawn = painter.text(
            Pos2::new(rect.right() - 10.0, y),
            Align2::RIGHT_TOP,
            &notification.message,
            FontId::proportional(13.0),
            color,
        );
        y += drawn.height() + 6.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glow_layers_shrink_inward() {
        let layers = glow_layers(20.0, Color32::from_rgba_unmultiplied(255, 0, 0, 100));
        assert_eq!(layers.len(), GLOW_STEPS);
        assert!(layers.windows(2).all(|w| w[0].0 > w[1].0));
        assert!(layers.iter().all(|(radius, _)| *radius > 0.0));
    }

    #[test]
    fn test_to_pos_offsets_by_origin() {
        let pos = to_pos(Pos2::new(10.0, 20.0), &Point::new(5.0, 7.5));
        assert_eq!(pos, Pos2::new(15.0, 27.5));
    }
}
