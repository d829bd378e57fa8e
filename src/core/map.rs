//! The map context: camera, nodes, selection and layers in one place.
//!
//! `PeerMap` is the only owner of mutable engine state. Feed messages are
//! applied between frames, so a frame always sees either the whole of a
//! reconciliation or none of it.

use crate::{
    core::{
        clock::{Clock, SystemClock},
        config::{clamped_secs, EngineOptions, FrameTimingConfig},
        geo::Point,
        viewport::{Viewport, ViewportSize},
    },
    feed::provider::{FeedMessage, PeerRequest},
    input::{
        events::{EventHandled, InputEvent},
        handler::{Action, InputHandler, InputTargets},
        selection::{HoverOverlay, PinnedOverlay, Selection},
    },
    layers::{
        base::LayerView,
        geometry::{load_geometry_dir, LayerLoadReport, OCEAN_COLOR},
        manager::LayerManager,
    },
    nodes::{
        entity::NodeEntity,
        manager::{NetworkSummary, NodeManager, ReconcileReport},
        snapshot::{ActionOutcome, ChangeEvent, NodeInfo, PeerId, SystemStats},
    },
    rendering::{
        context::{RenderContext, Rgba},
        nodes::{paint_nodes, NodeView},
    },
    spatial::index::HitIndex,
    MapError, Result,
};
use std::{
    collections::VecDeque,
    path::Path,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Backend reachability, from the latest fetch outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Nothing fetched yet
    Connecting,
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Short-lived message shown after a peer request completes
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Duration,
}

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub layers_drawn: usize,
    pub nodes_drawn: usize,
    pub purged: usize,
    pub camera_moving: bool,
    pub commands: usize,
}

/// Decides when the next frame is due at the target rate
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last_frame: Option<Duration>,
    frames: u64,
}

impl FramePacer {
    pub fn new(config: &FrameTimingConfig) -> Self {
        Self {
            interval: config.frame_interval(),
            last_frame: None,
            frames: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` and records the frame when one is due at `now`
    pub fn should_render(&mut self, now: Duration) -> bool {
        let due = self
            .last_frame
            .map_or(true, |last| now.saturating_sub(last) >= self.interval);
        if due {
            self.last_frame = Some(now);
            self.frames += 1;
        }
        due
    }

    /// Wait before the next frame is due
    pub fn time_until_next(&self, now: Duration) -> Duration {
        self.last_frame
            .map(|last| (last + self.interval).saturating_sub(now))
            .unwrap_or(Duration::ZERO)
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

pub struct PeerMap {
    options: EngineOptions,
    viewport: Viewport,
    nodes: NodeManager,
    selection: Selection,
    layers: LayerManager,
    hits: HitIndex,
    input: InputHandler,
    clock: Arc<dyn Clock>,
    /// Unix seconds at the clock's epoch
    unix_offset: f64,
    background: Rgba,
    status: ConnectionStatus,
    node_info: Option<NodeInfo>,
    system: Option<SystemStats>,
    recent_changes: VecDeque<ChangeEvent>,
    notifications: Vec<Notification>,
    pending_requests: Vec<PeerRequest>,
    last_reconcile: Option<ReconcileReport>,
}

impl PeerMap {
    /// Creates a map driven by the system clock, without geometry
    pub fn new(options: EngineOptions, size: ViewportSize) -> Self {
        Self::with_clock(options, size, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(options: EngineOptions, size: ViewportSize, clock: Arc<dyn Clock>) -> Self {
        let unix_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        let unix_offset = unix_now - clock.now().as_secs_f64();

        Self {
            viewport: Viewport::new(size, options.camera.clone()),
            nodes: NodeManager::new(options.lifecycle.clone()),
            selection: Selection::new(),
            layers: LayerManager::new(),
            hits: HitIndex::new(),
            input: InputHandler::new(),
            clock,
            unix_offset,
            background: OCEAN_COLOR,
            status: ConnectionStatus::Connecting,
            node_info: None,
            system: None,
            recent_changes: VecDeque::new(),
            notifications: Vec::new(),
            pending_requests: Vec::new(),
            last_reconcile: None,
            options,
        }
    }

    /// Pins wall-clock time: `unix_at_epoch` is the Unix time at the
    /// clock's zero
    pub fn set_unix_offset(&mut self, unix_at_epoch: f64) {
        self.unix_offset = unix_at_epoch;
    }

    /// Loads the static layers from `dir`, replacing any loaded before
    pub fn load_geometry(&mut self, dir: Option<&Path>) -> LayerLoadReport {
        let (layers, report) = load_geometry_dir(dir, &self.options.layers);
        for layer in layers {
            self.layers.add_layer(Box::new(layer));
        }
        report
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    fn unix_now(&self, now: Duration) -> f64 {
        self.unix_offset + now.as_secs_f64()
    }

    // --- Render loop ---------------------------------------------------------------------------

    /// Renders one frame at the clock's current time
    pub fn tick(&mut self, context: &mut RenderContext) -> FrameStats {
        let now = self.clock.now();
        self.frame(now, context)
    }

    /// Advances camera and lifecycle to `now` and records the frame into
    /// `context`
    pub fn frame(&mut self, now: Duration, context: &mut RenderContext) -> FrameStats {
        let camera_moving = self.viewport.step();
        let purged = self.nodes.advance(now);
        self.selection.invalidate(&self.nodes);

        let size = *self.viewport.size();
        let camera = *self.viewport.current();
        let wraps = self.viewport.wrap_offsets();

        context.begin_frame(size.width, size.height);
        context.clear(self.background);

        let layer_view = LayerView {
            camera: &camera,
            size: &size,
            wrap_offsets: &wraps,
            background: self.background,
        };
        let layers_drawn = self.layers.render(context, &layer_view);

        let node_view = NodeView {
            camera: &camera,
            size: &size,
            wrap_offsets: &wraps,
        };
        let nodes_drawn = match paint_nodes(
            context,
            self.nodes.drawable(),
            &node_view,
            &self.selection,
            now,
            self.nodes.config(),
        ) {
            Ok(count) => count,
            Err(err) => {
                log::warn!("node painting failed: {err}");
                0
            }
        };

        self.hits = HitIndex::build(self.nodes.alive(), &camera, &size, &wraps);
        self.notifications.retain(|n| n.expires_at > now);

        log::trace!("frame: {layers_drawn} layers, {nodes_drawn} nodes, {purged} purged");
        FrameStats {
            layers_drawn,
            nodes_drawn,
            purged,
            camera_moving,
            commands: context.get_drawing_queue().len(),
        }
    }

    // --- Feed ----------------------------------------------------------------------------------

    pub fn apply_feed(&mut self, message: FeedMessage) {
        let now = self.clock.now();
        self.apply_feed_at(message, now);
    }

    /// Applies a feed message as of `now`
    pub fn apply_feed_at(&mut self, message: FeedMessage, now: Duration) {
        if message.is_success() {
            self.set_status(ConnectionStatus::Online);
        }
        match message {
            FeedMessage::Peers(snapshot) => {
                let report = self.nodes.reconcile(&snapshot, now, self.unix_now(now));
                let dropped = self.selection.invalidate(&self.nodes);
                if dropped.pin {
                    log::debug!("pin cleared by reconciliation");
                }
                self.rebuild_hits();
                self.last_reconcile = Some(report);
            }
            FeedMessage::NodeInfo(info) => self.node_info = Some(info),
            FeedMessage::System(stats) => self.system = Some(stats),
            FeedMessage::Changes(mut events) => {
                events.sort_by(|a, b| b.time.total_cmp(&a.time));
                events.truncate(self.options.interaction.max_recent_changes);
                self.recent_changes = events.into();
            }
            FeedMessage::FetchFailed { kind, error } => {
                log::warn!("{kind} feed unavailable, keeping last data: {error}");
                self.set_status(ConnectionStatus::Offline);
            }
            FeedMessage::ActionResult { request, outcome } => {
                self.notify_outcome(request, &outcome, now);
            }
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            log::info!("backend status {:?} -> {:?}", self.status, status);
            self.status = status;
        }
    }

    fn notify_outcome(&mut self, request: PeerRequest, outcome: &ActionOutcome, now: Duration) {
        let id = request.peer_id();
        let (kind, message) = if outcome.success {
            let message = match (request, &outcome.banned_ip) {
                (PeerRequest::Ban(_), Some(ip)) => format!("Banned {ip} (peer #{id})"),
                (PeerRequest::Ban(_), None) => format!("Banned peer #{id}"),
                (PeerRequest::Disconnect(_), _) => format!("Disconnected peer #{id}"),
            };
            (NotificationKind::Success, message)
        } else {
            let reason = outcome.error.as_deref().unwrap_or("no response");
            (
                NotificationKind::Error,
                format!("Failed to {} peer #{id}: {reason}", request.verb()),
            )
        };
        self.push_notification(kind, message, now);
    }

    fn push_notification(&mut self, kind: NotificationKind, message: String, now: Duration) {
        let ttl = clamped_secs(self.options.interaction.notification_ttl_secs, 0.0);
        self.notifications.push(Notification {
            kind,
            message,
            expires_at: now + ttl,
        });
    }

    // --- Input and selection -------------------------------------------------------------------

    pub fn handle_input(&mut self, event: &InputEvent) -> EventHandled {
        let mut actions = Vec::new();
        let handled = self.input.handle_event(
            event,
            InputTargets {
                viewport: &mut self.viewport,
                selection: &self.selection,
                hits: &self.hits,
                hit_radius: self.options.interaction.hit_radius_px,
            },
            &mut actions,
        );
        for action in actions {
            match action {
                Action::Hover(id) => {
                    self.selection.set_hover(id);
                }
                Action::Pin(id) => {
                    self.select_and_recenter(id);
                }
                Action::ClearPin => {
                    self.selection.unpin();
                }
            }
        }
        handled
    }

    /// Nearest alive node within `radius` pixels of a screen point, across
    /// every wrap copy, as of the last frame
    pub fn find_nearest(&self, screen: Point, radius: f64) -> Option<PeerId> {
        self.hits.nearest(&screen, radius).map(|hit| hit.id)
    }

    /// Hover-equivalent from outside the map; the camera does not move.
    /// Unknown ids clear the hover.
    pub fn highlight(&mut self, id: Option<PeerId>) {
        let id = id.filter(|&id| self.nodes.is_alive(id));
        self.selection.set_hover(id);
    }

    /// Pins `id` and animates the camera onto it. Returns `false` for ids
    /// without an alive node.
    pub fn select_and_recenter(&mut self, id: PeerId) -> bool {
        let Some(node) = self.nodes.get(id).filter(|n| n.is_alive()) else {
            return false;
        };
        let position = node.position;
        self.selection.pin(id);
        let zoom = self.viewport.focus_on(&position);
        log::debug!("pinned peer {id}, recentering at zoom {zoom:.2}");
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_pinned(&self, id: PeerId) -> bool {
        self.selection.is_pinned(id)
    }

    pub fn is_hovered(&self, id: PeerId) -> bool {
        self.selection.is_hovered(id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Alive nodes in id order, for the peer table
    pub fn visible_list(&self) -> Vec<&NodeEntity> {
        self.nodes.visible_list()
    }

    pub fn hover_overlay(&self) -> Option<HoverOverlay> {
        let node = self.nodes.get(self.selection.hovered()?)?;
        let offset = self.options.interaction.hover_offset_px;
        // Table hovers have no pointer; anchor at the node instead
        let cursor = match self.input.pointer() {
            Some(pointer) => pointer,
            None => self.node_screen_position(node)?,
        };
        Some(HoverOverlay::for_node(node, cursor, offset, self.clock.now()))
    }

    pub fn pinned_overlay(&self) -> Option<PinnedOverlay> {
        let node = self.nodes.get(self.selection.pinned()?)?;
        let anchor = self.node_screen_position(node)?;
        Some(PinnedOverlay::for_node(node, anchor, self.clock.now()))
    }

    fn node_screen_position(&self, node: &NodeEntity) -> Option<Point> {
        let wraps = self.viewport.wrap_offsets();
        NodeView {
            camera: self.viewport.current(),
            size: self.viewport.size(),
            wrap_offsets: &wraps,
        }
        .nearest_screen_position(node)
    }

    fn rebuild_hits(&mut self) {
        let wraps = self.viewport.wrap_offsets();
        self.hits = HitIndex::build(
            self.nodes.alive(),
            self.viewport.current(),
            self.viewport.size(),
            &wraps,
        );
    }

    // --- Peer requests -------------------------------------------------------------------------

    pub fn request_disconnect(&mut self, id: PeerId) -> Result<()> {
        self.queue_request(PeerRequest::Disconnect(id))
    }

    /// Refused for peers whose network has no bannable address
    pub fn request_ban(&mut self, id: PeerId) -> Result<()> {
        self.queue_request(PeerRequest::Ban(id))
    }

    fn queue_request(&mut self, request: PeerRequest) -> Result<()> {
        let id = request.peer_id();
        let Some(node) = self.nodes.get(id).filter(|n| n.is_alive()) else {
            return Err(MapError::Feed(format!("peer #{id} is not connected")));
        };
        if let PeerRequest::Ban(_) = request {
            if !node.network.can_ban() {
                let message = format!("{} peers cannot be banned", node.network.label());
                let now = self.clock.now();
                self.push_notification(NotificationKind::Error, message.clone(), now);
                return Err(MapError::Feed(message));
            }
        }
        self.pending_requests.push(request);
        Ok(())
    }

    /// Requests queued since the last call, for forwarding to the backend
    pub fn drain_requests(&mut self) -> Vec<PeerRequest> {
        std::mem::take(&mut self.pending_requests)
    }

    // --- Accessors -----------------------------------------------------------------------------

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Height of the collapsible panel covering the bottom of the map
    pub fn set_bottom_inset(&mut self, inset: f64) {
        self.viewport.set_bottom_inset(inset);
    }

    pub fn nodes(&self) -> &NodeManager {
        &self.nodes
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerManager {
        &mut self.layers
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn node_info(&self) -> Option<&NodeInfo> {
        self.node_info.as_ref()
    }

    pub fn system_stats(&self) -> Option<&SystemStats> {
        self.system.as_ref()
    }

    /// Newest first
    pub fn recent_changes(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.recent_changes.iter()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn network_summary(&self) -> NetworkSummary {
        self.nodes.network_summary()
    }

    pub fn last_reconcile(&self) -> Option<&ReconcileReport> {
        self.last_reconcile.as_ref()
    }
}
