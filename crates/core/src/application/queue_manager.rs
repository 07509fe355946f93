//! Queue Manager - public control surface of the scheduler
//!
//! Every operation here completes synchronously against the in-memory
//! registry; only the outcome of a dispatch is asynchronous.

use super::backoff::BackoffPolicy;
use super::constants::DEFAULT_EVENT_CAPACITY;
use super::dispatcher::{self, DispatchContext};
use super::events::DispatchFailure;
use super::pending::{PendingResult, WorkItem};
use super::registry::{QueueRegistry, QueueSnapshot};
use crate::domain::{validate_queue_name, QueueConfig, RequestDescriptor, DEFAULT_QUEUE};
use crate::error::{DispatchError, Result};
use crate::port::{IdProvider, Transport, UuidProvider};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Queue Manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Configuration of queues created implicitly by `enqueue`, and of the
    /// default queue
    pub default_queue: QueueConfig,
    /// Diagnostic events buffered per subscriber
    pub event_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_queue: QueueConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Named, independently paced FIFO queues in front of a `Transport`
///
/// Cloning yields another handle to the same queues.
///
/// Operations that may start a dispatch (`enqueue`, `start`) spawn Tokio
/// tasks and must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct QueueManager {
    ctx: Arc<DispatchContext>,
    id_provider: Arc<dyn IdProvider>,
    default_queue: QueueConfig,
}

impl QueueManager {
    /// Create a queue manager with all dependencies injected
    ///
    /// The default queue (`"main"`) exists from the start, stopped.
    pub fn new(
        transport: Arc<dyn Transport>,
        id_provider: Arc<dyn IdProvider>,
        config: ManagerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let mut registry = QueueRegistry::default();
        registry.ensure(DEFAULT_QUEUE, config.default_queue);

        Self {
            ctx: Arc::new(DispatchContext {
                registry: Mutex::new(registry),
                transport,
                backoff: BackoffPolicy::new(),
                events,
            }),
            id_provider,
            default_queue: config.default_queue,
        }
    }

    /// Create a queue manager with UUID item IDs and default configuration
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, Arc::new(UuidProvider), ManagerConfig::default())
    }

    /// Create `name` with `config` unless it already exists
    ///
    /// An existing queue keeps its configuration.
    pub fn ensure_queue(&self, name: &str, config: QueueConfig) -> Result<()> {
        validate_queue_name(name)?;

        let mut registry = self.ctx.lock();
        let (_, created) = registry.ensure(name, config);
        if created {
            info!(
                queue = %name,
                pace_ms = config.pace_interval.as_millis() as u64,
                capacity = %config.capacity,
                "Queue created"
            );
        }
        Ok(())
    }

    /// Stop `name`, reject its pending requests as cleared, and forget it
    ///
    /// A dispatch already in flight still delivers its result. Returns
    /// whether the queue existed.
    pub fn remove_queue(&self, name: &str) -> bool {
        let removed = self.ctx.lock().remove(name);
        let Some(mut queue) = removed else {
            return false;
        };

        queue.running = false;
        let rejected = reject_all(queue.drain_pending(), true);
        info!(queue = %name, rejected = rejected, "Queue removed");
        true
    }

    /// Append a request to the tail of its queue
    ///
    /// The queue is created with the default configuration if needed. When
    /// the queue is running and idle, dispatch starts immediately.
    ///
    /// # Errors
    /// - DispatchError::QueueFull if the queue is at capacity; the request
    ///   is not added
    /// - DispatchError::Domain if the queue name is invalid
    pub fn enqueue(&self, request: RequestDescriptor) -> Result<PendingResult> {
        let name = request.queue().to_string();
        validate_queue_name(&name)?;
        let id = self.id_provider.generate_id();

        let mut registry = self.ctx.lock();
        let (queue, created) = registry.ensure(&name, self.default_queue);
        if created {
            info!(queue = %name, "Queue created on first use");
        }

        if queue.config.capacity.is_full(queue.pending.len()) {
            let capacity = queue.config.capacity.limit().unwrap_or_default();
            warn!(queue = %name, capacity = capacity, "Queue full, request dropped");
            return Err(DispatchError::QueueFull {
                queue: name,
                capacity,
            });
        }

        let (item, pending) = WorkItem::new(id, request);
        debug!(queue = %name, item_id = %item.id, position = queue.pending.len(), "Request queued");
        queue.pending.push_back(item);
        dispatcher::kick(&self.ctx, &name, queue);

        Ok(pending)
    }

    /// Send `request` right away, bypassing its queue
    ///
    /// No pacing, no capacity check, and the queue's backoff state is left
    /// untouched. Failures are not broadcast.
    ///
    /// # Errors
    /// - DispatchError::Transport if the call fails
    pub async fn send_now(&self, request: RequestDescriptor) -> Result<serde_json::Value> {
        debug!(
            method = %request.method(),
            destination = %request.destination(),
            "Sending request outside any queue"
        );
        let request = Arc::new(request);
        Ok(dispatcher::send_isolated(&self.ctx.transport, &request).await?)
    }

    /// Remove the pending request at `index` without sending it
    ///
    /// Its result fails with `RemovedFromQueue { cleared: false }`. A request
    /// already pulled for dispatch is out of reach. Returns whether a request
    /// was removed.
    pub fn cancel(&self, name: &str, index: usize) -> bool {
        let removed = self
            .ctx
            .lock()
            .get_mut(name)
            .and_then(|queue| queue.pending.remove(index));

        match removed {
            Some(item) => {
                debug!(queue = %name, item_id = %item.id, index = index, "Request cancelled");
                item.fail(DispatchError::RemovedFromQueue { cleared: false });
                true
            }
            None => false,
        }
    }

    /// Reject every pending request as cleared, in one step
    ///
    /// The queue keeps running (if it was) and accepts new work. Returns the
    /// number of rejected requests.
    pub fn clear(&self, name: &str) -> usize {
        let drained = self.ctx.lock().get_mut(name).map(|q| q.drain_pending());
        let rejected = drained.map(|items| reject_all(items, true)).unwrap_or(0);
        if rejected > 0 {
            info!(queue = %name, rejected = rejected, "Queue cleared");
        }
        rejected
    }

    /// Let the queue advance automatically, dispatching now if it is idle
    ///
    /// Returns whether the queue exists.
    pub fn start(&self, name: &str) -> bool {
        let mut registry = self.ctx.lock();
        let Some(queue) = registry.get_mut(name) else {
            return false;
        };
        queue.running = true;
        info!(queue = %name, "Queue started");
        dispatcher::kick(&self.ctx, name, queue);
        true
    }

    /// Stop automatic advancement
    ///
    /// An advance that is already pacing or in flight still goes out and
    /// delivers; no further advance is scheduled after it. Returns whether
    /// the queue exists.
    pub fn stop(&self, name: &str) -> bool {
        let mut registry = self.ctx.lock();
        let Some(queue) = registry.get_mut(name) else {
            return false;
        };
        queue.running = false;
        info!(queue = %name, "Queue stopped");
        true
    }

    /// `stop` followed by `clear`; returns the number of rejected requests
    pub fn stop_and_clear(&self, name: &str) -> usize {
        self.stop(name);
        self.clear(name)
    }

    pub fn snapshot(&self, name: &str) -> Option<QueueSnapshot> {
        self.ctx.lock().get(name).map(|q| q.snapshot(name))
    }

    pub fn queue_names(&self) -> Vec<String> {
        self.ctx.lock().names()
    }

    /// Subscribe to diagnostic events, one per failed dispatch
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchFailure> {
        self.ctx.events.subscribe()
    }
}

fn reject_all(items: VecDeque<WorkItem>, cleared: bool) -> usize {
    let count = items.len();
    for item in items {
        item.fail(DispatchError::RemovedFromQueue { cleared });
    }
    count
}
