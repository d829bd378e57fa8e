//! Node painting: glow, arrival bloom, core dot and selection rings.

use crate::{
    core::{
        config::LifecycleConfig,
        geo::Point,
        projection,
        viewport::{Camera, ViewportSize},
    },
    input::selection::{Emphasis, Selection},
    nodes::entity::{NodeEntity, NodeVisual},
    rendering::context::{LineRenderStyle, PointRenderStyle, RenderContext, Rgba},
    Result,
};
use std::time::Duration;

const HOVER_RING: Rgba = Rgba::new(235, 240, 255, 170);
const PIN_RING: Rgba = Rgba::rgb(255, 214, 102);

/// Camera and wrap copies the painter projects against
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub camera: &'a Camera,
    pub size: &'a ViewportSize,
    pub wrap_offsets: &'a [i32],
}

impl NodeView<'_> {
    /// Screen positions of every wrap copy of `node`
    pub fn screen_positions<'n>(&'n self, node: &'n NodeEntity) -> impl Iterator<Item = Point> + 'n {
        let position = node.position.clamped();
        self.wrap_offsets.iter().map(move |&wrap| {
            let shifted = position.shifted(wrap);
            projection::to_screen(shifted.lng, shifted.lat, self.camera, self.size)
        })
    }

    /// Copy of `node` closest to the view center
    pub fn nearest_screen_position(&self, node: &NodeEntity) -> Option<Point> {
        let center = Point::new(self.size.width / 2.0, self.size.height / 2.0);
        self.screen_positions(node)
            .filter(Point::is_finite)
            .min_by(|a, b| a.distance_to(&center).total_cmp(&b.distance_to(&center)))
    }
}

/// Paints `nodes` in order at every wrap offset. Returns how many nodes
/// produced a visible frame.
pub fn paint_nodes<'a, I>(
    context: &mut RenderContext,
    nodes: I,
    view: &NodeView<'_>,
    selection: &Selection,
    now: Duration,
    config: &LifecycleConfig,
) -> Result<usize>
where
    I: IntoIterator<Item = &'a NodeEntity>,
{
    let mut painted = 0;
    for node in nodes {
        let visual = node.visual(now, config);
        if visual.opacity <= 0.0 {
            continue;
        }
        let emphasis = selection.emphasis(node.id);
        for screen in view.screen_positions(node) {
            paint_node(context, &screen, &visual, emphasis)?;
        }
        painted += 1;
    }
    Ok(painted)
}

fn paint_node(context: &mut RenderContext, screen: &Point, visual: &NodeVisual, emphasis: Emphasis) -> Result<()> {
    let color = visual.color;

    context.render_glow(
        screen,
        visual.glow_radius as f32,
        color.with_opacity(visual.glow_alpha),
    )?;

    if let Some(bloom) = &visual.arrival {
        context.render_glow(
            screen,
            (bloom.ring_radius * 1.6) as f32,
            color.mix(Rgba::WHITE, 0.3).with_opacity(bloom.glow_alpha * 0.5),
        )?;
        context.render_ring(
            screen,
            bloom.ring_radius as f32,
            &LineRenderStyle {
                color: color.with_opacity(bloom.ring_alpha),
                width: 1.5,
            },
        )?;
    }

    // Dim nodes drift toward the background rather than going grey
    let fill = Rgba::rgb(0, 0, 0)
        .mix(color, visual.brightness)
        .with_opacity(visual.opacity);
    context.render_point(
        screen,
        &PointRenderStyle {
            fill_color: fill,
            stroke_color: Rgba::WHITE.with_opacity(0.25 * visual.opacity * visual.brightness),
            stroke_width: 0.5,
            radius: visual.radius as f32,
        },
    )?;

    let ring = match emphasis {
        Emphasis::None => return Ok(()),
        Emphasis::Hovered => LineRenderStyle {
            color: HOVER_RING.with_opacity(visual.opacity),
            width: 1.5,
        },
        Emphasis::Pinned => LineRenderStyle {
            color: PIN_RING.with_opacity(visual.opacity),
            width: 2.0,
        },
    };
    context.render_ring(screen, (visual.radius + 5.0) as f32, &ring)?;
    if emphasis == Emphasis::Pinned {
        context.render_ring(
            screen,
            (visual.radius + 9.0) as f32,
            &LineRenderStyle {
                color: PIN_RING.with_opacity(0.35 * visual.opacity),
                width: 1.0,
            },
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng,
        nodes::{
            entity::NodeUpdate, network::NetworkType, placement::Placement, snapshot::PeerRecord,
        },
        rendering::context::DrawCommand,
    };

    fn node(id: u64, lng: f64) -> NodeEntity {
        NodeEntity::new(
            id,
            NodeUpdate {
                record: PeerRecord {
                    id: Some(id),
                    ..PeerRecord::default()
                },
                network: NetworkType::Ipv4,
                placement: Placement::Geolocated(LatLng::new(0.0, lng)),
                connection_age: None,
            },
            Duration::ZERO,
        )
    }

    fn rings(context: &RenderContext) -> usize {
        context
            .get_drawing_queue()
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Ring { .. }))
            .count()
    }

    #[test]
    fn test_fresh_node_is_invisible() {
        let camera = Camera::default();
        let size = ViewportSize::new(800.0, 600.0);
        let view = NodeView {
            camera: &camera,
            size: &size,
            wrap_offsets: &[0],
        };
        let mut context = RenderContext::new(800.0, 600.0);
        let nodes = [node(1, 0.0)];
        let painted = paint_nodes(
            &mut context,
            &nodes,
            &view,
            &Selection::new(),
            Duration::ZERO,
            &LifecycleConfig::default(),
        )
        .unwrap();
        assert_eq!(painted, 0);
        assert!(context.get_drawing_queue().is_empty());
    }

    #[test]
    fn test_pinned_node_gets_two_rings() {
        let camera = Camera::default();
        let size = ViewportSize::new(800.0, 600.0);
        let view = NodeView {
            camera: &camera,
            size: &size,
            wrap_offsets: &[0],
        };
        let config = LifecycleConfig::default();
        // Past the arrival bloom so only selection rings remain
        let now = Duration::from_secs_f64(config.arrival_secs + 1.0);
        let nodes = [node(1, 0.0), node(2, 30.0)];

        let mut selection = Selection::new();
        let mut context = RenderContext::new(800.0, 600.0);
        paint_nodes(&mut context, &nodes, &view, &selection, now, &config).unwrap();
        assert_eq!(rings(&context), 0);

        selection.pin(1);
        selection.set_hover(Some(2));
        let mut context = RenderContext::new(800.0, 600.0);
        paint_nodes(&mut context, &nodes, &view, &selection, now, &config).unwrap();
        assert_eq!(rings(&context), 3);
    }

    #[test]
    fn test_nearest_copy_is_closest_to_center() {
        let camera = Camera::new(380.0, 0.0, 1.0);
        let size = ViewportSize::new(800.0, 600.0);
        let view = NodeView {
            camera: &camera,
            size: &size,
            wrap_offsets: &[0, 1],
        };
        let entity = node(1, -170.0);
        let nearest = view.nearest_screen_position(&entity).unwrap();
        let copies: Vec<Point> = view.screen_positions(&entity).collect();
        assert_eq!(copies.len(), 2);
        assert_eq!(nearest, copies[1]);
    }
}
