use anyhow::Context;
use peermap::{
    core::viewport::ViewportSize,
    nodes::snapshot::format_connection_age,
    ui::widget::{MapView, PeerMapUiExt},
    EngineOptions, FeedHandle, HttpProvider, PeerId, PeerMap,
};
use std::{path::PathBuf, sync::Arc};

const DEFAULT_BACKEND: &str = "http://127.0.0.1:58333";
const PANEL_HEIGHT: f32 = 220.0;

/// Standalone peer map viewer
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let backend = std::env::var("PEERMAP_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND.to_string());
    let geometry_dir = std::env::var_os("PEERMAP_GEOMETRY_DIR").map(PathBuf::from);
    let options = match std::env::var_os("PEERMAP_CONFIG") {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", PathBuf::from(&path).display()))?;
            EngineOptions::from_json_str(&json).context("parsing engine options")?
        }
        None => EngineOptions::default(),
    };

    let provider = HttpProvider::new(backend.as_str(), options.polling.request_timeout())
        .context("building HTTP client")?;
    let (feed, worker) = FeedHandle::spawn(Arc::new(provider), options.polling.clone());
    log::info!("polling {backend}");

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Peer Map"),
        ..Default::default()
    };

    eframe::run_native(
        "peermap-app",
        native,
        Box::new(move |_cc| Box::new(PeerMapApp::new(options, geometry_dir, feed))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))?;

    worker.abort();
    Ok(())
}

struct PeerMapApp {
    map: PeerMap,
    view: MapView,
    feed: FeedHandle,
    show_peers: bool,
    /// Height of the peer panel covering the bottom of the map
    panel_height: f64,
    /// Peer hovered in the table last frame
    row_hover: Option<PeerId>,
}

impl PeerMapApp {
    fn new(options: EngineOptions, geometry_dir: Option<PathBuf>, feed: FeedHandle) -> Self {
        let view = MapView::new(&options);
        let mut map = PeerMap::new(options, ViewportSize::new(1280.0, 800.0));
        let report = map.load_geometry(geometry_dir.as_deref());
        for (kind, error) in &report.failed {
            log::warn!("{kind:?} layer unavailable: {error}");
        }
        Self {
            map,
            view,
            feed,
            show_peers: true,
            panel_height: 0.0,
            row_hover: None,
        }
    }

    fn sync_feed(&mut self) {
        for message in self.feed.drain() {
            self.map.apply_feed(message);
        }
        for request in self.map.drain_requests() {
            if let Err(err) = self.feed.request(request) {
                log::error!("dropping {} request: {err}", request.verb());
            }
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.toggle_value(&mut self.show_peers, "Peers");
            if ui.button("Refresh").clicked() {
                if let Err(err) = self.feed.force_refresh() {
                    log::error!("refresh failed: {err}");
                }
            }
            ui.separator();
            if let Some(info) = self.map.node_info() {
                if let Some(block) = &info.last_block {
                    ui.label(format!("block {}", block.height));
                }
                if info.is_syncing() {
                    ui.label("syncing");
                }
                if let Some(subversion) = &info.subversion {
                    ui.label(subversion);
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(stats) = self.map.system_stats() {
                    ui.label(format!(
                        "down {:.1} kB/s  up {:.1} kB/s",
                        stats.rx_bps / 1000.0,
                        stats.tx_bps / 1000.0
                    ));
                    if let Some(mem) = stats.mem_pct {
                        ui.label(format!("mem {mem:.0}%"));
                    }
                    if let Some(cpu) = stats.cpu_pct {
                        ui.label(format!("cpu {cpu:.0}%"));
                    }
                }
                let camera = self.map.viewport().current();
                ui.label(format!("zoom {:.2}", camera.zoom));
            });
        });
    }

    fn peer_table(&mut self, ui: &mut egui::Ui) {
        let now = self.map.now();
        let rows: Vec<_> = self
            .map
            .visible_list()
            .into_iter()
            .map(|node| {
                let place = [node.record.city.as_str(), node.record.country.as_str()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                (
                    node.id,
                    format!(
                        "#{:<5} {:<6} {:<4} {:<24} {:<28} {}",
                        node.id,
                        node.network.label(),
                        node.direction.label(),
                        node.record.host(),
                        if node.placeholder { "(unlocated)".to_string() } else { place },
                        format_connection_age(node.connection_age(now)),
                    ),
                )
            })
            .collect();

        let mut hovered_row = None;
        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            for (id, text) in rows {
                let selected = self.map.is_pinned(id) || self.map.is_hovered(id);
                let response = ui.selectable_label(selected, egui::RichText::new(text).monospace());
                if response.hovered() {
                    hovered_row = Some(id);
                }
                if response.clicked() {
                    self.map.select_and_recenter(id);
                }
            }
        });

        let ctx = ui.ctx();
        let pointer_on_map = ctx.input(|i| i.pointer.hover_pos().is_some()) && !ctx.is_pointer_over_area();
        if let Some(highlight) = row_highlight(self.row_hover, hovered_row, pointer_on_map) {
            self.map.highlight(highlight);
        }
        self.row_hover = hovered_row;
    }

    fn recent_changes(&self, ui: &mut egui::Ui) {
        for change in self.map.recent_changes().take(8) {
            ui.label(format!("{:?} {}:{}", change.kind, change.peer.ip, change.peer.port));
        }
    }
}

/// Highlight change caused by the table, if any. Leaving a row only clears
/// the highlight when the map widget does not own the pointer, since the map
/// already set its own hover earlier in the frame.
fn row_highlight(previous: Option<PeerId>, current: Option<PeerId>, pointer_on_map: bool) -> Option<Option<PeerId>> {
    match (previous, current) {
        (_, Some(id)) if previous != current => Some(Some(id)),
        (Some(_), None) if !pointer_on_map => Some(None),
        _ => None,
    }
}

impl eframe::App for PeerMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_feed();

        self.map.set_bottom_inset(self.panel_height);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| self.top_bar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.peer_map(&mut self.view, &mut self.map);
            });

        self.panel_height = if self.show_peers {
            let width = ctx.screen_rect().width() - 16.0;
            let panel = egui::Area::new(egui::Id::new("peer_panel"))
                .anchor(egui::Align2::LEFT_BOTTOM, egui::Vec2::ZERO)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    egui::Frame::window(ui.style()).show(ui, |ui| {
                        ui.set_width(width);
                        ui.set_height(PANEL_HEIGHT);
                        ui.columns(2, |columns| {
                            self.peer_table(&mut columns[0]);
                            self.recent_changes(&mut columns[1]);
                        });
                    });
                });
            panel.response.rect.height() as f64
        } else {
            0.0
        };
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(err) = self.feed.shutdown() {
            log::debug!("feed already stopped: {err}");
        }
    }
}
