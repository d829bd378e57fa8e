//! Timer-free polling schedule.
//!
//! The schedule only answers "what is due at `now`"; whoever owns a timer
//! (the tokio worker, a test) drives it with explicit timestamps.

use crate::core::config::{clamped_secs, PollingConfig};
use std::time::Duration;

/// One periodically fetched data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Peers,
    NodeInfo,
    System,
    Changes,
}

impl FeedKind {
    pub const ALL: [FeedKind; 4] = [
        FeedKind::Peers,
        FeedKind::NodeInfo,
        FeedKind::System,
        FeedKind::Changes,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            FeedKind::Peers => 0,
            FeedKind::NodeInfo => 1,
            FeedKind::System => 2,
            FeedKind::Changes => 3,
        }
    }

    pub fn interval(self, config: &PollingConfig) -> Duration {
        let secs = match self {
            FeedKind::Peers => config.peers_secs,
            FeedKind::NodeInfo => config.node_info_secs,
            FeedKind::System => config.system_secs,
            FeedKind::Changes => config.changes_secs,
        };
        clamped_secs(secs, 0.1)
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeedKind::Peers => "peers",
            FeedKind::NodeInfo => "node-info",
            FeedKind::System => "system",
            FeedKind::Changes => "changes",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct PollSchedule {
    intervals: [Duration; 4],
    /// `None` means due immediately
    next_due: [Option<Duration>; 4],
}

impl PollSchedule {
    /// Every feed starts out due
    pub fn new(config: &PollingConfig) -> Self {
        Self {
            intervals: FeedKind::ALL.map(|kind| kind.interval(config)),
            next_due: [None; 4],
        }
    }

    pub fn is_due(&self, kind: FeedKind, now: Duration) -> bool {
        self.next_due[kind.index()].map_or(true, |due| now >= due)
    }

    /// Feeds due at `now`; each is rescheduled one interval later
    pub fn take_due(&mut self, now: Duration) -> Vec<FeedKind> {
        let due: Vec<FeedKind> = FeedKind::ALL
            .into_iter()
            .filter(|&kind| self.is_due(kind, now))
            .collect();
        for &kind in &due {
            self.next_due[kind.index()] = Some(now + self.intervals[kind.index()]);
        }
        due
    }

    /// Makes `kind` due on the next check
    pub fn force(&mut self, kind: FeedKind) {
        self.next_due[kind.index()] = None;
    }

    /// Time until the earliest feed is due, zero if one already is
    pub fn until_next(&self, now: Duration) -> Duration {
        self.next_due
            .iter()
            .map(|due| due.map_or(Duration::ZERO, |due| due.saturating_sub(now)))
            .min()
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_everything_due_at_start() {
        let mut schedule = PollSchedule::new(&PollingConfig::default());
        assert_eq!(schedule.take_due(secs(0)), FeedKind::ALL.to_vec());
        assert!(schedule.take_due(secs(0)).is_empty());
    }

    #[test]
    fn test_feeds_fire_at_their_own_interval() {
        let mut schedule = PollSchedule::new(&PollingConfig::default());
        schedule.take_due(secs(0));

        assert_eq!(schedule.until_next(secs(0)), secs(2));
        assert_eq!(schedule.take_due(secs(2)), vec![FeedKind::System]);
        assert_eq!(schedule.take_due(secs(5)), vec![FeedKind::System, FeedKind::Changes]);
        assert_eq!(
            schedule.take_due(secs(10)),
            vec![FeedKind::Peers, FeedKind::System, FeedKind::Changes]
        );
    }

    #[test]
    fn test_huge_interval_is_clamped() {
        let config = PollingConfig {
            peers_secs: 1e300,
            ..PollingConfig::default()
        };
        let mut schedule = PollSchedule::new(&config);
        schedule.take_due(secs(0));
        assert_eq!(FeedKind::Peers.interval(&config), secs(86_400));
        assert!(schedule.is_due(FeedKind::Peers, secs(86_400)));
    }

    #[test]
    fn test_force_makes_feed_due() {
        let mut schedule = PollSchedule::new(&PollingConfig::default());
        schedule.take_due(secs(0));
        schedule.force(FeedKind::Peers);
        assert_eq!(schedule.until_next(secs(1)), Duration::ZERO);
        assert_eq!(schedule.take_due(secs(1)), vec![FeedKind::Peers]);
        assert!(!schedule.is_due(FeedKind::Peers, secs(10)));
        assert!(schedule.is_due(FeedKind::Peers, secs(11)));
    }
}
