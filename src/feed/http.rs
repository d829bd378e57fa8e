//! `DataProvider` backed by the dashboard's JSON API.

use crate::{
    feed::provider::{DataProvider, PeerRequest},
    nodes::snapshot::{ActionOutcome, ChangeEvent, NodeInfo, PeerSnapshot, SystemStats},
    MapError, Result,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("peermap/", env!("CARGO_PKG_VERSION"));

pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProvider {
    /// `base_url` is the backend origin, e.g. `http://127.0.0.1:58333`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

/// Endpoint a request is posted to
pub fn request_path(request: &PeerRequest) -> &'static str {
    match request {
        PeerRequest::Disconnect(_) => "/api/peer/disconnect",
        PeerRequest::Ban(_) => "/api/peer/ban",
    }
}

/// Throughput from `/api/netspeed` with usage percentages from `/api/stats`
pub fn decode_system_stats(speed: Value, usage: Option<&Value>) -> Result<SystemStats> {
    let mut stats: SystemStats = serde_json::from_value(speed)?;
    if let Some(usage) = usage {
        stats.merge_usage(usage);
    }
    Ok(stats)
}

#[async_trait]
impl DataProvider for HttpProvider {
    async fn peers(&self) -> Result<PeerSnapshot> {
        let value: Value = self.get_json("/api/peers").await?;
        if !value.is_array() {
            return Err(MapError::Feed("peer snapshot is not an array".to_string()));
        }
        Ok(PeerSnapshot::from_value(value))
    }

    async fn node_info(&self) -> Result<NodeInfo> {
        self.get_json("/api/info").await
    }

    async fn system_stats(&self) -> Result<SystemStats> {
        let (speed, usage) = tokio::join!(
            self.get_json::<Value>("/api/netspeed"),
            self.get_json::<Value>("/api/stats")
        );
        let usage = usage
            .map_err(|err| log::warn!("resource usage unavailable: {err}"))
            .ok();
        decode_system_stats(speed?, usage.as_ref())
    }

    async fn changes(&self) -> Result<Vec<ChangeEvent>> {
        let value: Value = self.get_json("/api/changes").await?;
        Ok(ChangeEvent::list_from_value(value))
    }

    async fn send_request(&self, request: PeerRequest) -> Result<ActionOutcome> {
        let body = serde_json::json!({ "peer_id": request.peer_id() });
        let response = self
            .client
            .post(self.url(request_path(&request)))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(ActionOutcome::failed(format!(
                "{} failed: HTTP {}",
                request.verb(),
                response.status()
            )));
        }
        Ok(response.json::<ActionOutcome>().await?)
    }
}
