use crate::{
    feed::schedule::FeedKind,
    nodes::snapshot::{ActionOutcome, ChangeEvent, NodeInfo, PeerId, PeerSnapshot, SystemStats},
    Result,
};
use async_trait::async_trait;

/// Request the map forwards to the backend; never executed locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerRequest {
    Disconnect(PeerId),
    /// Disconnect and ban the peer's address
    Ban(PeerId),
}

impl PeerRequest {
    pub fn peer_id(&self) -> PeerId {
        match self {
            PeerRequest::Disconnect(id) | PeerRequest::Ban(id) => *id,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            PeerRequest::Disconnect(_) => "disconnect",
            PeerRequest::Ban(_) => "ban",
        }
    }
}

/// Everything the feed delivers to the map, applied between frames
#[derive(Debug, Clone)]
pub enum FeedMessage {
    Peers(PeerSnapshot),
    NodeInfo(NodeInfo),
    System(SystemStats),
    Changes(Vec<ChangeEvent>),
    FetchFailed { kind: FeedKind, error: String },
    ActionResult {
        request: PeerRequest,
        outcome: ActionOutcome,
    },
}

impl FeedMessage {
    /// Whether the message proves the backend reachable
    pub fn is_success(&self) -> bool {
        !matches!(self, FeedMessage::FetchFailed { .. })
    }
}

/// Source of the periodically polled data and sink for peer requests
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn peers(&self) -> Result<PeerSnapshot>;

    async fn node_info(&self) -> Result<NodeInfo>;

    async fn system_stats(&self) -> Result<SystemStats>;

    /// Recent connect/disconnect events in the order the backend keeps them
    async fn changes(&self) -> Result<Vec<ChangeEvent>>;

    async fn send_request(&self, request: PeerRequest) -> Result<ActionOutcome>;
}
