use crate::{
    core::config::LifecycleConfig,
    nodes::{
        entity::{NodeEntity, NodeUpdate},
        network::{Direction, NetworkType},
        placement::place,
        snapshot::{PeerId, PeerSnapshot},
    },
    prelude::{HashMap, HashSet},
};
use std::time::Duration;

/// What a reconciliation changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: usize,
    pub updated: usize,
    pub faded: usize,
    pub purged: usize,
    /// Records skipped for lacking an identifier or repeating one
    pub malformed: usize,
    /// Records whose network tag was not recognized
    pub unknown_networks: usize,
}

impl ReconcileReport {
    /// Nothing entered or left the map
    pub fn is_stable(&self) -> bool {
        self.added == 0 && self.faded == 0 && self.purged == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkCounts {
    pub inbound: usize,
    pub outbound: usize,
}

impl NetworkCounts {
    pub fn total(&self) -> usize {
        self.inbound + self.outbound
    }
}

/// Per-network inbound/outbound counts of alive nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSummary {
    counts: HashMap<NetworkType, NetworkCounts>,
}

impl NetworkSummary {
    pub fn get(&self, network: NetworkType) -> NetworkCounts {
        self.counts.get(&network).copied().unwrap_or_default()
    }

    pub fn total(&self) -> NetworkCounts {
        self.counts.values().fold(NetworkCounts::default(), |acc, c| NetworkCounts {
            inbound: acc.inbound + c.inbound,
            outbound: acc.outbound + c.outbound,
        })
    }
}

/// Owns the visualized entities and reconciles them against snapshots.
///
/// Alive entities are keyed by peer id, so at most one exists per id.
/// Fading entities live apart until their fade-out has fully elapsed; a
/// peer that reconnects with the same id while its old entity is fading
/// gets a fresh entity.
pub struct NodeManager {
    alive: HashMap<PeerId, NodeEntity>,
    fading: Vec<NodeEntity>,
    config: LifecycleConfig,
    last_spawn: Option<Duration>,
}

impl NodeManager {
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            alive: HashMap::default(),
            fading: Vec::new(),
            config,
            last_spawn: None,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Applies a snapshot taken at `now` (engine clock) / `now_unix` (wall
    /// clock, used for connection ages).
    pub fn reconcile(&mut self, snapshot: &PeerSnapshot, now: Duration, now_unix: f64) -> ReconcileReport {
        let mut report = ReconcileReport {
            malformed: snapshot.malformed,
            ..ReconcileReport::default()
        };

        let present: HashSet<PeerId> = snapshot.records.iter().filter_map(|r| r.id).collect();

        let gone: Vec<PeerId> = self
            .alive
            .keys()
            .filter(|id| !present.contains(id))
            .copied()
            .collect();
        for id in gone {
            if let Some(mut entity) = self.alive.remove(&id) {
                entity.mark_gone(now);
                self.fading.push(entity);
                report.faded += 1;
            }
        }

        let mut seen = HashSet::default();
        for record in &snapshot.records {
            let Some(id) = record.id else {
                log::warn!("skipping peer record without id (addr {:?})", record.addr);
                report.malformed += 1;
                continue;
            };
            if !seen.insert(id) {
                log::warn!("skipping repeated peer id {id}");
                report.malformed += 1;
                continue;
            }

            let network = match record.network_type() {
                Ok(network) => network,
                Err(err) => {
                    let inferred = record.inferred_network();
                    log::warn!("peer {id}: {err}, treating as {inferred}");
                    report.unknown_networks += 1;
                    inferred
                }
            };
            let update = NodeUpdate {
                record: record.clone(),
                network,
                placement: place(record, network),
                connection_age: record.connection_age_at(now_unix),
            };

            match self.alive.get_mut(&id) {
                Some(entity) => {
                    entity.apply(update, now);
                    report.updated += 1;
                }
                None => {
                    let spawned_at = self.next_spawn_stamp(now);
                    self.alive.insert(id, NodeEntity::new(id, update, spawned_at));
                    report.added += 1;
                }
            }
        }

        report.purged = self.advance(now);

        log::debug!(
            "reconciled {} records: +{} ~{} -{} purged {} malformed {} unknown networks {}",
            snapshot.len(),
            report.added,
            report.updated,
            report.faded,
            report.purged,
            report.malformed,
            report.unknown_networks
        );
        report
    }

    /// Drops fading entities whose fade-out is complete. Returns how many.
    pub fn advance(&mut self, now: Duration) -> usize {
        let before = self.fading.len();
        let config = &self.config;
        self.fading.retain(|entity| !entity.should_purge(now, config));
        before - self.fading.len()
    }

    /// Spawn stamps strictly increase even if the clock stalls
    fn next_spawn_stamp(&mut self, now: Duration) -> Duration {
        let stamp = match self.last_spawn {
            Some(last) if now <= last => last + Duration::from_micros(1),
            _ => now,
        };
        self.last_spawn = Some(stamp);
        stamp
    }

    /// Alive entity for `id`
    pub fn get(&self, id: PeerId) -> Option<&NodeEntity> {
        self.alive.get(&id)
    }

    pub fn is_alive(&self, id: PeerId) -> bool {
        self.alive.contains_key(&id)
    }

    pub fn alive(&self) -> impl Iterator<Item = &NodeEntity> {
        self.alive.values()
    }

    pub fn fading(&self) -> impl Iterator<Item = &NodeEntity> {
        self.fading.iter()
    }

    /// Everything still drawn: fading entities first so alive ones paint on top
    pub fn drawable(&self) -> impl Iterator<Item = &NodeEntity> {
        self.fading.iter().chain(self.alive.values())
    }

    /// Alive entities ordered by id, for building a synchronized table
    pub fn visible_list(&self) -> Vec<&NodeEntity> {
        let mut list: Vec<_> = self.alive.values().collect();
        list.sort_by_key(|entity| entity.id);
        list
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    pub fn tracked_count(&self) -> usize {
        self.alive.len() + self.fading.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked_count() == 0
    }

    pub fn network_summary(&self) -> NetworkSummary {
        let mut summary = NetworkSummary::default();
        for entity in self.alive.values() {
            let counts = summary.counts.entry(entity.network).or_default();
            match entity.direction {
                Direction::Inbound => counts.inbound += 1,
                Direction::Outbound => counts.outbound += 1,
            }
        }
        summary
    }
}

impl Default for NodeManager {
    fn default() -> Self {
        Self::new(LifecycleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::snapshot::PeerRecord;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn peer(id: u64, network: &str, direction: &str) -> PeerRecord {
        PeerRecord {
            id: Some(id),
            network: network.to_string(),
            ip: format!("203.0.113.{id}"),
            direction: direction.to_string(),
            location_status: "ok".to_string(),
            lat: Some(10.0 + id as f64),
            lon: Some(20.0),
            ..PeerRecord::default()
        }
    }

    fn snapshot(records: Vec<PeerRecord>) -> PeerSnapshot {
        PeerSnapshot::new(records)
    }

    #[test]
    fn test_out_of_range_timings_do_not_break_reconcile() {
        let mut manager = NodeManager::default();
        let slow = PeerRecord {
            ping_ms: 1e30,
            ..peer(1, "ipv4", "IN")
        };
        let time_traveller = PeerRecord {
            conntime: 1e300,
            ..peer(2, "ipv4", "OUT")
        };
        let report = manager.reconcile(&snapshot(vec![slow, time_traveller]), secs(0.0), 1_700_000_000.0);
        assert_eq!(report.added, 2);

        let config = manager.config().clone();
        let first = manager.get(1).unwrap();
        assert!(first.latency.is_none());
        let second = manager.get(2).unwrap();
        assert_eq!(second.connection_age(secs(5.0)), Some(secs(5.0)));
        assert!(second.visual(secs(5.0), &config).opacity > 0.0);
    }

    #[test]
    fn test_reconcile_adds_then_updates() {
        let mut manager = NodeManager::default();
        let snap = snapshot(vec![peer(1, "ipv4", "IN"), peer(2, "ipv6", "OUT")]);

        let first = manager.reconcile(&snap, secs(0.0), 0.0);
        assert_eq!(first.added, 2);
        assert_eq!(manager.alive_count(), 2);

        let second = manager.reconcile(&snap, secs(10.0), 10.0);
        assert_eq!(second.added, 0);
        assert_eq!(second.updated, 2);
        assert!(second.is_stable());
        assert_eq!(manager.tracked_count(), 2);
    }

    #[test]
    fn test_absent_peer_fades_then_purges() {
        let config = LifecycleConfig::default();
        let mut manager = NodeManager::new(config.clone());
        manager.reconcile(&snapshot(vec![peer(1, "ipv4", "IN")]), secs(0.0), 0.0);

        let report = manager.reconcile(&snapshot(vec![]), secs(10.0), 10.0);
        assert_eq!(report.faded, 1);
        assert!(!manager.is_alive(1));
        assert_eq!(manager.fading().count(), 1);

        assert_eq!(manager.advance(secs(10.0 + config.fade_out_secs - 0.001)), 0);
        assert_eq!(manager.advance(secs(10.0 + config.fade_out_secs)), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_reconnect_while_fading_spawns_fresh_entity() {
        let mut manager = NodeManager::default();
        manager.reconcile(&snapshot(vec![peer(1, "ipv4", "IN")]), secs(0.0), 0.0);
        manager.reconcile(&snapshot(vec![]), secs(5.0), 5.0);
        let report = manager.reconcile(&snapshot(vec![peer(1, "ipv4", "IN")]), secs(5.5), 5.5);

        assert_eq!(report.added, 1);
        assert_eq!(manager.alive_count(), 1);
        assert_eq!(manager.fading().count(), 1);
        assert_eq!(manager.get(1).unwrap().spawned_at(), secs(5.5));
    }

    #[test]
    fn test_spawn_stamps_strictly_increase() {
        let mut manager = NodeManager::default();
        manager.reconcile(&snapshot(vec![peer(1, "ipv4", "IN"), peer(2, "ipv4", "IN")]), secs(3.0), 0.0);
        let a = manager.get(1).unwrap().spawned_at();
        let b = manager.get(2).unwrap().spawned_at();
        assert_ne!(a, b);
        assert!(a.min(b) == secs(3.0));
    }

    #[test]
    fn test_malformed_and_unknown_records() {
        let mut manager = NodeManager::default();
        let mut nameless = peer(9, "ipv4", "IN");
        nameless.id = None;
        let mut strange = peer(3, "pigeon", "OUT");
        strange.addr = "abc.onion:8333".to_string();

        let report = manager.reconcile(
            &snapshot(vec![nameless, strange, peer(4, "ipv4", "IN"), peer(4, "ipv4", "IN")]),
            secs(0.0),
            0.0,
        );
        assert_eq!(report.added, 2);
        assert_eq!(report.malformed, 2);
        assert_eq!(report.unknown_networks, 1);
        assert_eq!(manager.get(3).unwrap().network, NetworkType::Onion);
    }

    #[test]
    fn test_network_summary() {
        let mut manager = NodeManager::default();
        manager.reconcile(
            &snapshot(vec![
                peer(1, "ipv4", "IN"),
                peer(2, "ipv4", "OUT"),
                peer(3, "ipv4", "OUT"),
                peer(4, "onion", "IN"),
            ]),
            secs(0.0),
            0.0,
        );
        let summary = manager.network_summary();
        assert_eq!(summary.get(NetworkType::Ipv4), NetworkCounts { inbound: 1, outbound: 2 });
        assert_eq!(summary.get(NetworkType::Onion).total(), 1);
        assert_eq!(summary.get(NetworkType::I2p).total(), 0);
        assert_eq!(summary.total().total(), 4);
    }

    #[test]
    fn test_visible_list_is_sorted() {
        let mut manager = NodeManager::default();
        manager.reconcile(
            &snapshot(vec![peer(8, "ipv4", "IN"), peer(2, "ipv4", "IN"), peer(5, "ipv4", "IN")]),
            secs(0.0),
            0.0,
        );
        let ids: Vec<_> = manager.visible_list().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 5, 8]);
    }
}
