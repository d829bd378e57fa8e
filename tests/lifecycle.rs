use peermap::{
    core::config::LifecycleConfig,
    nodes::{
        network::{LocationStatus, NetworkType},
        placement::{place, placeholder_position},
        NodeManager, NodePhase, PeerRecord, PeerSnapshot,
    },
};
use std::time::Duration;

const NOW_UNIX: f64 = 1_700_000_000.0;

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn located(id: u64, lon: f64, lat: f64) -> PeerRecord {
    PeerRecord {
        id: Some(id),
        network: "ipv4".to_string(),
        addr: format!("198.51.100.{id}:8333"),
        lon: Some(lon),
        lat: Some(lat),
        location_status: "ok".to_string(),
        conntime: NOW_UNIX - 60.0,
        ..PeerRecord::default()
    }
}

fn private(id: u64, addr: &str) -> PeerRecord {
    PeerRecord {
        id: Some(id),
        network: "ipv4".to_string(),
        addr: addr.to_string(),
        location_status: "private".to_string(),
        ..PeerRecord::default()
    }
}

#[test]
fn test_reconcile_is_idempotent() {
    let mut nodes = NodeManager::new(LifecycleConfig::default());
    let snapshot = PeerSnapshot::new(vec![located(1, -74.0, 40.0), located(2, 2.3, 48.9), located(3, 151.2, -33.9)]);

    let first = nodes.reconcile(&snapshot, secs(1.0), NOW_UNIX);
    assert_eq!(first.added, 3);

    let second = nodes.reconcile(&snapshot, secs(2.0), NOW_UNIX + 1.0);
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 3);
    assert_eq!(second.faded, 0);
    assert!(second.is_stable());

    let ids: Vec<_> = nodes.visible_list().iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(nodes.tracked_count(), 3);
}

#[test]
fn test_departed_peer_fades_then_purges_on_time() {
    let config = LifecycleConfig::default();
    let fade_out = config.fade_out_secs;
    let mut nodes = NodeManager::new(config.clone());

    nodes.reconcile(&PeerSnapshot::new(vec![located(1, -74.0, 40.0)]), secs(0.0), NOW_UNIX);
    let report = nodes.reconcile(&PeerSnapshot::new(Vec::new()), secs(10.0), NOW_UNIX + 10.0);
    assert_eq!(report.faded, 1);
    assert!(!nodes.is_alive(1));

    // Still drawn while fading, with falling opacity
    let early = nodes.fading().next().map(|n| n.visual(secs(10.5), &config));
    let late = nodes.fading().next().map(|n| n.visual(secs(10.0 + fade_out - 0.1), &config));
    let (early, late) = (early.unwrap(), late.unwrap());
    assert_eq!(early.phase, NodePhase::FadingOut);
    assert!(early.opacity > late.opacity);
    assert!(late.opacity > 0.0);
    assert_eq!(nodes.drawable().count(), 1);

    assert_eq!(nodes.advance(secs(10.0 + fade_out - 1e-3)), 0);
    assert_eq!(nodes.fading().count(), 1);

    let frame = 1.0 / 60.0;
    let mut t = 10.0 + fade_out - 1e-3;
    let mut purged_at = None;
    while purged_at.is_none() {
        t += frame;
        if nodes.advance(secs(t)) == 1 {
            purged_at = Some(t);
        }
    }
    let purged_at = purged_at.unwrap();
    assert!(purged_at >= 10.0 + fade_out);
    assert!(purged_at < 10.0 + fade_out + frame);
    assert!(nodes.is_empty());
}

#[test]
fn test_returning_peer_spawns_fresh() {
    let config = LifecycleConfig::default();
    let mut nodes = NodeManager::new(config.clone());
    let snapshot = PeerSnapshot::new(vec![located(7, 13.4, 52.5)]);

    nodes.reconcile(&snapshot, secs(0.0), NOW_UNIX);
    nodes.reconcile(&PeerSnapshot::new(Vec::new()), secs(10.0), NOW_UNIX + 10.0);
    let report = nodes.reconcile(&snapshot, secs(11.0), NOW_UNIX + 11.0);

    assert_eq!(report.added, 1);
    let node = nodes.get(7).unwrap();
    assert_eq!(node.phase(secs(11.1), &config), NodePhase::Spawning);
}

#[test]
fn test_private_peers_get_stable_placeholders() {
    let mut nodes = NodeManager::new(LifecycleConfig::default());
    let a = private(1, "192.168.1.5:8333");
    let b = private(2, "10.0.0.7:8333");
    nodes.reconcile(&PeerSnapshot::new(vec![a.clone(), b.clone()]), secs(0.0), NOW_UNIX);

    let node_a = nodes.get(1).unwrap();
    let node_b = nodes.get(2).unwrap();
    assert!(node_a.placeholder && node_b.placeholder);
    assert_eq!(node_a.location_status, LocationStatus::Private);
    assert_ne!(node_a.position, node_b.position);

    let again = place(&a, NetworkType::Ipv4);
    assert!(again.is_placeholder());
    assert_eq!(again.position(), node_a.position);
    assert_eq!(placeholder_position("192.168.1.5"), placeholder_position("192.168.1.5"));
}

#[test]
fn test_malformed_records_are_counted_not_fatal() {
    let json = r#"[
        {"id": 1, "network": "ipv4", "addr": "203.0.113.1:8333", "lat": 48.1, "lon": 11.6, "location_status": "ok"},
        {"network": "ipv4", "addr": "203.0.113.2:8333"},
        42,
        {"id": 3, "network": "mystery", "addr": "[2001:db8::3]:8333"}
    ]"#;
    let snapshot = PeerSnapshot::from_json_str(json).unwrap();
    let mut nodes = NodeManager::new(LifecycleConfig::default());
    let report = nodes.reconcile(&snapshot, secs(0.0), NOW_UNIX);

    assert_eq!(report.added, 2);
    assert_eq!(report.malformed, 2);
    assert_eq!(report.unknown_networks, 1);
    assert_eq!(nodes.get(3).map(|n| n.network), Some(NetworkType::Ipv6));
}
