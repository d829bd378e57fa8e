//! Hover and pin selection, and the overlays shown for them.
//!
//! Hover and pin are independent: the pointer may hover one node while
//! another stays pinned.

use crate::{
    core::geo::Point,
    nodes::{
        entity::NodeEntity,
        manager::NodeManager,
        snapshot::{format_connection_age, PeerId},
    },
};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emphasis {
    None,
    Hovered,
    Pinned,
}

/// Which selections an invalidation dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invalidated {
    pub hover: bool,
    pub pin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    hovered: Option<PeerId>,
    pinned: Option<PeerId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<PeerId> {
        self.hovered
    }

    pub fn pinned(&self) -> Option<PeerId> {
        self.pinned
    }

    pub fn is_hovered(&self, id: PeerId) -> bool {
        self.hovered == Some(id)
    }

    pub fn is_pinned(&self, id: PeerId) -> bool {
        self.pinned == Some(id)
    }

    /// Returns `true` when the hovered node changed
    pub fn set_hover(&mut self, id: Option<PeerId>) -> bool {
        let changed = self.hovered != id;
        self.hovered = id;
        changed
    }

    /// Returns `true` when the pinned node changed
    pub fn pin(&mut self, id: PeerId) -> bool {
        let changed = self.pinned != Some(id);
        self.pinned = Some(id);
        changed
    }

    /// Returns the previously pinned node
    pub fn unpin(&mut self) -> Option<PeerId> {
        self.pinned.take()
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.pinned = None;
    }

    /// Pinned wins over hovered
    pub fn emphasis(&self, id: PeerId) -> Emphasis {
        if self.is_pinned(id) {
            Emphasis::Pinned
        } else if self.is_hovered(id) {
            Emphasis::Hovered
        } else {
            Emphasis::None
        }
    }

    /// Drops references to nodes that are no longer alive
    pub fn invalidate(&mut self, nodes: &NodeManager) -> Invalidated {
        let mut dropped = Invalidated::default();
        if let Some(id) = self.hovered {
            if !nodes.is_alive(id) {
                self.hovered = None;
                dropped.hover = true;
            }
        }
        if let Some(id) = self.pinned {
            if !nodes.is_alive(id) {
                log::debug!("pinned peer {id} disappeared, clearing pin");
                self.pinned = None;
                dropped.pin = true;
            }
        }
        dropped
    }
}

/// Lightweight info box next to the cursor
#[derive(Debug, Clone, PartialEq)]
pub struct HoverOverlay {
    pub id: PeerId,
    pub anchor: Point,
    pub title: String,
    pub lines: Vec<String>,
}

impl HoverOverlay {
    pub fn for_node(node: &NodeEntity, cursor: Point, offset: f64, now: Duration) -> Self {
        Self {
            id: node.id,
            anchor: Point::new(cursor.x + offset, cursor.y + offset),
            title: overlay_title(node),
            lines: summary_lines(node, now),
        }
    }
}

/// Interactive panel for the pinned node
#[derive(Debug, Clone, PartialEq)]
pub struct PinnedOverlay {
    pub id: PeerId,
    /// Screen position of the pinned node's nearest copy
    pub anchor: Point,
    pub title: String,
    pub lines: Vec<String>,
    pub can_disconnect: bool,
    pub can_ban: bool,
}

impl PinnedOverlay {
    pub fn for_node(node: &NodeEntity, anchor: Point, now: Duration) -> Self {
        let record = &node.record;
        let mut lines = summary_lines(node, now);
        if !record.subver.is_empty() {
            lines.push(record.subver.clone());
        }
        if !record.isp.is_empty() {
            lines.push(format!("ISP {}", record.isp));
        }
        if !record.connection_type.is_empty() {
            lines.push(record.connection_type.clone());
        }
        Self {
            id: node.id,
            anchor,
            title: overlay_title(node),
            lines,
            can_disconnect: true,
            can_ban: node.network.can_ban(),
        }
    }
}

fn overlay_title(node: &NodeEntity) -> String {
    format!(
        "#{} {} {}",
        node.id,
        node.network.label(),
        node.direction.label()
    )
}

fn summary_lines(node: &NodeEntity, now: Duration) -> Vec<String> {
    let record = &node.record;
    let mut lines = Vec::with_capacity(4);
    if !record.addr.is_empty() {
        lines.push(record.addr.clone());
    }
    let mut location = record.display_location();
    if node.placeholder {
        location.push_str(" (approximate)");
    }
    lines.push(location);
    let ping = node
        .latency
        .map(|d| format!("{} ms", d.as_millis()))
        .unwrap_or_else(|| "-".to_string());
    lines.push(format!(
        "ping {ping} | up {}",
        format_connection_age(node.connection_age(now))
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::snapshot::{PeerRecord, PeerSnapshot};

    fn manager_with(ids: &[PeerId]) -> NodeManager {
        let mut manager = NodeManager::default();
        let records = ids
            .iter()
            .map(|&id| PeerRecord {
                id: Some(id),
                network: if id % 2 == 0 { "ipv4" } else { "onion" }.to_string(),
                addr: format!("198.51.100.{id}:8333"),
                ping_ms: 42.0,
                conntime: 1_000.0,
                ..PeerRecord::default()
            })
            .collect();
        manager.reconcile(&PeerSnapshot::new(records), Duration::ZERO, 1_090.0);
        manager
    }

    #[test]
    fn test_hover_and_pin_are_independent() {
        let mut selection = Selection::new();
        assert!(selection.pin(5));
        assert!(selection.set_hover(Some(6)));
        assert!(!selection.set_hover(Some(6)));
        assert_eq!(selection.pinned(), Some(5));
        assert_eq!(selection.hovered(), Some(6));
        assert_eq!(selection.emphasis(5), Emphasis::Pinned);
        assert_eq!(selection.emphasis(6), Emphasis::Hovered);
        assert_eq!(selection.emphasis(7), Emphasis::None);

        selection.set_hover(Some(5));
        assert_eq!(selection.emphasis(5), Emphasis::Pinned);
        assert_eq!(selection.unpin(), Some(5));
        assert_eq!(selection.emphasis(5), Emphasis::Hovered);
    }

    #[test]
    fn test_invalidate_drops_vanished_nodes() {
        let mut manager = manager_with(&[5, 6]);
        let mut selection = Selection::new();
        selection.pin(5);
        selection.set_hover(Some(6));
        assert_eq!(selection.invalidate(&manager), Invalidated::default());

        manager.reconcile(&PeerSnapshot::new(vec![]), Duration::from_secs(1), 0.0);
        let dropped = selection.invalidate(&manager);
        assert!(dropped.pin && dropped.hover);
        assert_eq!(selection, Selection::new());
    }

    #[test]
    fn test_pinned_overlay_offers_ban_only_for_clearnet() {
        let manager = manager_with(&[2, 3]);
        let now = Duration::from_secs(10);

        let clearnet = PinnedOverlay::for_node(manager.get(2).unwrap(), Point::default(), now);
        assert!(clearnet.can_disconnect);
        assert!(clearnet.can_ban);
        assert_eq!(clearnet.title, "#2 IPv4 OUT");

        let onion = PinnedOverlay::for_node(manager.get(3).unwrap(), Point::default(), now);
        assert!(onion.can_disconnect);
        assert!(!onion.can_ban);
    }

    #[test]
    fn test_hover_overlay_content() {
        let manager = manager_with(&[2]);
        let overlay = HoverOverlay::for_node(
            manager.get(2).unwrap(),
            Point::new(100.0, 50.0),
            14.0,
            Duration::from_secs(10),
        );
        assert_eq!(overlay.anchor, Point::new(114.0, 64.0));
        assert_eq!(overlay.lines[0], "198.51.100.2:8333");
        assert!(overlay.lines[1].ends_with("(approximate)"));
        assert_eq!(overlay.lines[2], "ping 42 ms | up 1m40s");
    }
}
