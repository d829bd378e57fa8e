//! Tokio polling worker.
//!
//! Fetches run as independent tasks and report through a crossbeam channel,
//! which the UI thread drains between frames without blocking. A failed or
//! slow fetch only delays its own feed. Each fetch carries a per-feed ticket
//! and a result is dropped once a later fetch of the same feed has reported.

use crate::{
    core::config::PollingConfig,
    feed::{
        provider::{DataProvider, FeedMessage, PeerRequest},
        schedule::{FeedKind, PollSchedule},
    },
    nodes::snapshot::ActionOutcome,
    MapError, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::Instant,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommand {
    Request(PeerRequest),
    /// Refetch the peer snapshot now
    ForceRefresh,
    Shutdown,
}

/// UI-side end of a running worker
pub struct FeedHandle {
    messages: Receiver<FeedMessage>,
    commands: UnboundedSender<WorkerCommand>,
}

impl FeedHandle {
    /// Spawns the worker on the current tokio runtime
    pub fn spawn(provider: Arc<dyn DataProvider>, config: PollingConfig) -> (Self, JoinHandle<()>) {
        let (message_tx, message_rx) = unbounded();
        let (command_tx, command_rx) = unbounded_channel();
        let task = tokio::spawn(run_worker(provider, config, message_tx, command_rx));
        (
            Self {
                messages: message_rx,
                commands: command_tx,
            },
            task,
        )
    }

    /// Everything delivered since the last call, oldest first
    pub fn drain(&self) -> Vec<FeedMessage> {
        self.messages.try_iter().collect()
    }

    pub fn send(&self, command: WorkerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| MapError::ChannelClosed("feed worker stopped".to_string()))
    }

    pub fn request(&self, request: PeerRequest) -> Result<()> {
        self.send(WorkerCommand::Request(request))
    }

    pub fn force_refresh(&self) -> Result<()> {
        self.send(WorkerCommand::ForceRefresh)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(WorkerCommand::Shutdown)
    }
}

/// Per-feed tickets in issue order, plus the newest ticket delivered
#[derive(Debug, Default)]
struct FeedSequence {
    issued: [AtomicU64; 4],
    delivered: Mutex<[u64; 4]>,
}

impl FeedSequence {
    fn issue(&self, kind: FeedKind) -> u64 {
        self.issued[kind.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Sends `message` unless a fetch issued after `ticket` already reported
    fn deliver(&self, kind: FeedKind, ticket: u64, message: FeedMessage, messages: &Sender<FeedMessage>) {
        let mut delivered = self.delivered.lock().unwrap_or_else(PoisonError::into_inner);
        let newest = &mut delivered[kind.index()];
        if ticket <= *newest {
            log::debug!("dropping stale {kind} result #{ticket}, #{newest} already delivered");
            return;
        }
        *newest = ticket;
        if messages.send(message).is_err() {
            log::debug!("{kind} result dropped, map is gone");
        }
    }
}

/// Polls `provider` on the configured intervals until shut down or until
/// every command sender is dropped.
pub async fn run_worker(
    provider: Arc<dyn DataProvider>,
    config: PollingConfig,
    messages: Sender<FeedMessage>,
    mut commands: UnboundedReceiver<WorkerCommand>,
) {
    let started = Instant::now();
    let mut schedule = PollSchedule::new(&config);
    let sequence = Arc::new(FeedSequence::default());
    log::info!("feed worker started");

    loop {
        for kind in schedule.take_due(started.elapsed()) {
            let ticket = sequence.issue(kind);
            tokio::spawn(fetch(provider.clone(), kind, ticket, sequence.clone(), messages.clone()));
        }

        let wait = schedule.until_next(started.elapsed());
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            command = commands.recv() => match command {
                Some(WorkerCommand::Request(request)) => {
                    tokio::spawn(forward_request(provider.clone(), request, sequence.clone(), messages.clone()));
                }
                Some(WorkerCommand::ForceRefresh) => schedule.force(FeedKind::Peers),
                Some(WorkerCommand::Shutdown) | None => break,
            },
        }
    }
    log::info!("feed worker stopped");
}

async fn fetch(
    provider: Arc<dyn DataProvider>,
    kind: FeedKind,
    ticket: u64,
    sequence: Arc<FeedSequence>,
    messages: Sender<FeedMessage>,
) {
    let result = match kind {
        FeedKind::Peers => provider.peers().await.map(FeedMessage::Peers),
        FeedKind::NodeInfo => provider.node_info().await.map(FeedMessage::NodeInfo),
        FeedKind::System => provider.system_stats().await.map(FeedMessage::System),
        FeedKind::Changes => provider.changes().await.map(FeedMessage::Changes),
    };
    let message = result.unwrap_or_else(|err| {
        log::warn!("{kind} fetch failed: {err}");
        FeedMessage::FetchFailed {
            kind,
            error: err.to_string(),
        }
    });
    sequence.deliver(kind, ticket, message, &messages);
}

/// Sends the request, reports the outcome, then refetches peers so the
/// result shows up without waiting for the next interval.
async fn forward_request(
    provider: Arc<dyn DataProvider>,
    request: PeerRequest,
    sequence: Arc<FeedSequence>,
    messages: Sender<FeedMessage>,
) {
    log::info!("requesting {} of peer {}", request.verb(), request.peer_id());
    let outcome = match provider.send_request(request).await {
        Ok(outcome) => outcome,
        Err(err) => {
            log::warn!("{} request for peer {} failed: {err}", request.verb(), request.peer_id());
            ActionOutcome::failed(err.to_string())
        }
    };
    if messages.send(FeedMessage::ActionResult { request, outcome }).is_err() {
        return;
    }
    let ticket = sequence.issue(FeedKind::Peers);
    fetch(provider, FeedKind::Peers, ticket, sequence, messages).await;
}
