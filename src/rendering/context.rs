use crate::{
    core::{bounds::Bounds, geo::Point},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "egui")]
use egui::Color32;

/// Straight-alpha color that can convert to egui::Color32
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// Scales the alpha channel by `opacity` in `[0, 1]`
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            a: (self.a as f64 * opacity).round() as u8,
            ..self
        }
    }

    /// Mixes toward `other` by `t` in `[0, 1]`, alpha included
    pub fn mix(self, other: Rgba, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: channel(self.a, other.a),
        }
    }

    pub fn is_invisible(&self) -> bool {
        self.a == 0
    }
}

#[cfg(feature = "egui")]
impl From<Rgba> for Color32 {
    fn from(color: Rgba) -> Self {
        Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

#[cfg(feature = "egui")]
impl From<Color32> for Rgba {
    fn from(color: Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointRenderStyle {
    pub fill_color: Rgba,
    pub stroke_color: Rgba,
    pub stroke_width: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineRenderStyle {
    pub color: Rgba,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Center,
    LeftCenter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderStyle {
    pub color: Rgba,
    pub size: f32,
    pub anchor: TextAnchor,
}

/// Commands queued by the engine and replayed by a painter backend
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole canvas
    Clear { color: Rgba },
    /// Filled disc with optional outline
    Point {
        position: Point,
        style: PointRenderStyle,
    },
    /// Unfilled circle
    Ring {
        center: Point,
        radius: f32,
        style: LineRenderStyle,
    },
    /// Soft radial glow fading from `color` at the center to transparent
    Glow {
        center: Point,
        radius: f32,
        color: Rgba,
    },
    /// Open polyline
    Line {
        points: Vec<Point>,
        style: LineRenderStyle,
    },
    /// Pre-triangulated filled area
    Mesh {
        vertices: Vec<Point>,
        indices: Vec<u32>,
        color: Rgba,
    },
    Text {
        position: Point,
        text: String,
        style: TextRenderStyle,
    },
}

/// Backend-agnostic frame recorder.
///
/// Primitives entirely outside the clip bounds are dropped at record time.
pub struct RenderContext {
    pub width: f64,
    pub height: f64,
    pub drawing_queue: Vec<DrawCommand>,
    pub clip_bounds: Option<Bounds>,
}

impl RenderContext {
    /// Create a new render context
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            clip_bounds: None,
        }
    }

    /// Begin a frame, clipping to the canvas
    pub fn begin_frame(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.drawing_queue.clear();
        self.clip_bounds = Some(Bounds::from_coords(0.0, 0.0, width, height));
    }

    pub fn clear(&mut self, color: Rgba) {
        self.drawing_queue.push(DrawCommand::Clear { color });
    }

    /// Render a point at the given position with the given style
    pub fn render_point(&mut self, position: &Point, style: &PointRenderStyle) -> Result<()> {
        check_finite(position)?;
        let reach = style.radius as f64 + style.stroke_width as f64;
        if style.fill_color.is_invisible() && style.stroke_color.is_invisible() {
            return Ok(());
        }
        if self.is_clipped(&Bounds::new(*position, *position).expanded(reach)) {
            return Ok(());
        }
        self.drawing_queue.push(DrawCommand::Point {
            position: *position,
            style: style.clone(),
        });
        Ok(())
    }

    pub fn render_ring(&mut self, center: &Point, radius: f32, style: &LineRenderStyle) -> Result<()> {
        check_finite(center)?;
        if style.color.is_invisible() || radius <= 0.0 {
            return Ok(());
        }
        let reach = radius as f64 + style.width as f64;
        if self.is_clipped(&Bounds::new(*center, *center).expanded(reach)) {
            return Ok(());
        }
        self.drawing_queue.push(DrawCommand::Ring {
            center: *center,
            radius,
            style: style.clone(),
        });
        Ok(())
    }

    pub fn render_glow(&mut self, center: &Point, radius: f32, color: Rgba) -> Result<()> {
        check_finite(center)?;
        if color.is_invisible() || radius <= 0.0 {
            return Ok(());
        }
        if self.is_clipped(&Bounds::new(*center, *center).expanded(radius as f64)) {
            return Ok(());
        }
        self.drawing_queue.push(DrawCommand::Glow {
            center: *center,
            radius,
            color,
        });
        Ok(())
    }

    /// Render a line with the given points and style
    pub fn render_line(&mut self, points: &[Point], style: &LineRenderStyle) -> Result<()> {
        if points.len() < 2 || style.color.is_invisible() {
            return Ok(());
        }
        let Some(bounds) = Bounds::enclosing(points) else {
            return Ok(());
        };
        if self.is_clipped(&bounds.expanded(style.width as f64)) {
            return Ok(());
        }
        self.drawing_queue.push(DrawCommand::Line {
            points: points.to_vec(),
            style: style.clone(),
        });
        Ok(())
    }

    /// Render a triangulated area; `indices` come in triples
    pub fn render_mesh(&mut self, vertices: Vec<Point>, indices: Vec<u32>, color: Rgba) -> Result<()> {
        if indices.len() % 3 != 0 {
            return Err(MapError::Render(format!(
                "mesh index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if indices.iter().any(|&i| i as usize >= vertices.len()) {
            return Err(MapError::Render("mesh index out of range".to_string()));
        }
        if indices.is_empty() || color.is_invisible() {
            return Ok(());
        }
        let Some(bounds) = Bounds::enclosing(&vertices) else {
            return Ok(());
        };
        if self.is_clipped(&bounds) {
            return Ok(());
        }
        self.drawing_queue.push(DrawCommand::Mesh {
            vertices,
            indices,
            color,
        });
        Ok(())
    }

    pub fn render_text(&mut self, position: &Point, text: &str, style: &TextRenderStyle) -> Result<()> {
        check_finite(position)?;
        if text.is_empty() || style.color.is_invisible() {
            return Ok(());
        }
        // Rough extent; labels are short
        let half_width = text.chars().count() as f64 * style.size as f64 * 0.6;
        if self.is_clipped(&Bounds::new(*position, *position).expanded(half_width.max(style.size as f64))) {
            return Ok(());
        }
        self.drawing_queue.push(DrawCommand::Text {
            position: *position,
            text: text.to_string(),
            style: style.clone(),
        });
        Ok(())
    }

    /// Get the current drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    pub fn set_clip_bounds(&mut self, bounds: Bounds) {
        self.clip_bounds = Some(bounds);
    }

    pub fn clear_clip_bounds(&mut self) {
        self.clip_bounds = None;
    }

    fn is_clipped(&self, extent: &Bounds) -> bool {
        self.clip_bounds
            .map(|clip| !clip.intersects(extent))
            .unwrap_or(false)
    }
}

fn check_finite(point: &Point) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(MapError::Render(format!(
            "non-finite screen position ({}, {})",
            point.x, point.y
        )))
    }
}
