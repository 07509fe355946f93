// Queue Registry - one record per named queue

use super::pending::WorkItem;
use crate::domain::{QueueConfig, QueueName};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

/// Runtime state of one queue
pub(crate) struct QueueState {
    pub(crate) config: QueueConfig,
    pub(crate) pending: VecDeque<WorkItem>,
    /// Accepts automatic advancement
    pub(crate) running: bool,
    /// A dispatch cycle owns this queue
    pub(crate) dispatching: bool,
    /// Completion time of the most recent dispatch
    pub(crate) last_dispatch_at: Option<Instant>,
    /// Backoff added on top of the pacing interval for the next dispatch only
    pub(crate) extension: Duration,
    /// Incarnation of this queue; changes when a removed name is recreated
    pub(crate) epoch: u64,
}

impl QueueState {
    fn new(config: QueueConfig, epoch: u64) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
            running: false,
            dispatching: false,
            last_dispatch_at: None,
            extension: Duration::ZERO,
            epoch,
        }
    }

    /// Time left before the next dispatch may start
    pub(crate) fn pacing_wait(&self, now: Instant) -> Duration {
        match self.last_dispatch_at {
            None => Duration::ZERO,
            Some(last) => self
                .config
                .pace_interval
                .saturating_add(self.extension)
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    pub(crate) fn record_dispatch(&mut self, finished_at: Instant, extension: Duration) {
        self.last_dispatch_at = Some(finished_at);
        self.extension = extension;
    }

    /// Take every pending item in one step
    pub(crate) fn drain_pending(&mut self) -> VecDeque<WorkItem> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn snapshot(&self, name: &str) -> QueueSnapshot {
        QueueSnapshot {
            name: name.to_string(),
            config: self.config,
            pending: self.pending.len(),
            running: self.running,
            dispatching: self.dispatching,
        }
    }
}

/// Point-in-time view of a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub name: QueueName,
    pub config: QueueConfig,
    pub pending: usize,
    pub running: bool,
    pub dispatching: bool,
}

/// Map from queue name to queue record
#[derive(Default)]
pub(crate) struct QueueRegistry {
    queues: HashMap<QueueName, QueueState>,
    next_epoch: u64,
}

impl QueueRegistry {
    /// Queue named `name`, created with `config` if absent
    ///
    /// Returns the record and whether it was created by this call. An
    /// existing queue keeps its configuration.
    pub(crate) fn ensure(&mut self, name: &str, config: QueueConfig) -> (&mut QueueState, bool) {
        let next_epoch = &mut self.next_epoch;
        let mut created = false;
        let queue = self
            .queues
            .entry(name.to_string())
            .or_insert_with(|| {
                created = true;
                *next_epoch += 1;
                QueueState::new(config, *next_epoch)
            });
        (queue, created)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&QueueState> {
        self.queues.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut QueueState> {
        self.queues.get_mut(name)
    }

    /// The queue a dispatch cycle was started for, if it still exists
    pub(crate) fn current(&self, name: &str, epoch: u64) -> Option<&QueueState> {
        self.queues.get(name).filter(|q| q.epoch == epoch)
    }

    pub(crate) fn current_mut(&mut self, name: &str, epoch: u64) -> Option<&mut QueueState> {
        self.queues.get_mut(name).filter(|q| q.epoch == epoch)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<QueueState> {
        self.queues.remove(name)
    }

    pub(crate) fn names(&self) -> Vec<QueueName> {
        let mut names: Vec<_> = self.queues.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::backoff::BackoffPolicy;
    use crate::domain::{Capacity, RequestDescriptor};
    use crate::port::{ResponseNotOk, TransportError};

    #[test]
    fn test_ensure_keeps_existing_config() {
        let mut registry = QueueRegistry::default();
        let custom = QueueConfig::new(Duration::from_millis(100), Capacity::Bounded(2));

        let (_, created) = registry.ensure("main", custom);
        assert!(created);

        let (queue, created) = registry.ensure("main", QueueConfig::default());
        assert!(!created);
        assert_eq!(queue.config, custom);
    }

    #[test]
    fn test_recreated_queue_gets_new_epoch() {
        let mut registry = QueueRegistry::default();
        let first = registry.ensure("main", QueueConfig::default()).0.epoch;

        assert!(registry.remove("main").is_some());
        assert!(registry.remove("main").is_none());

        let second = registry.ensure("main", QueueConfig::default()).0.epoch;
        assert_ne!(first, second);
        assert!(registry.current_mut("main", first).is_none());
        assert!(registry.current_mut("main", second).is_some());
    }

    #[test]
    fn test_pacing_wait() {
        let mut registry = QueueRegistry::default();
        let config = QueueConfig::default().with_pace_interval(Duration::from_millis(100));
        let (queue, _) = registry.ensure("main", config);
        let now = Instant::now();

        // Never dispatched: no wait
        assert_eq!(queue.pacing_wait(now), Duration::ZERO);

        queue.record_dispatch(now, Duration::ZERO);
        assert_eq!(queue.pacing_wait(now), Duration::from_millis(100));
        assert_eq!(
            queue.pacing_wait(now + Duration::from_millis(40)),
            Duration::from_millis(60)
        );
        assert_eq!(
            queue.pacing_wait(now + Duration::from_millis(500)),
            Duration::ZERO
        );

        queue.record_dispatch(now, Duration::from_secs(2));
        assert_eq!(queue.pacing_wait(now), Duration::from_millis(2100));
    }

    #[test]
    fn test_backoff_extension_is_additive_to_pace() {
        let mut registry = QueueRegistry::default();
        let config = QueueConfig::default().with_pace_interval(Duration::from_millis(100));
        let (queue, _) = registry.ensure("main", config);
        let policy = BackoffPolicy::new();
        let now = Instant::now();

        let limited = TransportError::NotOk(
            ResponseNotOk::new(429, "Too Many Requests").with_retry_after("3"),
        );
        queue.record_dispatch(now, policy.extension(&limited));
        assert_eq!(queue.pacing_wait(now), Duration::from_millis(3100));

        // The extension applies to the next dispatch only
        let failed = TransportError::NotOk(ResponseNotOk::new(500, "Internal Server Error"));
        queue.record_dispatch(now, policy.extension(&failed));
        assert_eq!(queue.pacing_wait(now), Duration::from_millis(100));
    }

    #[test]
    fn test_drain_and_snapshot() {
        let mut registry = QueueRegistry::default();
        let (queue, _) = registry.ensure("main", QueueConfig::default());
        for i in 0..3 {
            let (item, _pending) =
                WorkItem::new(format!("item-{}", i), RequestDescriptor::new("v1/server"));
            queue.pending.push_back(item);
        }

        assert_eq!(queue.snapshot("main").pending, 3);
        let drained = queue.drain_pending();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].id, "item-0");

        let snapshot = registry.get("main").unwrap().snapshot("main");
        assert_eq!(snapshot.pending, 0);
        assert!(!snapshot.running);
        assert!(!snapshot.dispatching);
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = QueueRegistry::default();
        registry.ensure("zeta", QueueConfig::default());
        registry.ensure("alpha", QueueConfig::default());
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }
}
