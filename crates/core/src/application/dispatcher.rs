// Dispatcher - the sequential processing loop of one queue
//
// Idle -> Pacing -> InFlight -> (Idle | Pacing ...)
//
// A cycle is spawned by the control surface when a running queue is idle and
// has work. It owns the queue (`dispatching == true`) until it goes Idle.

use super::backoff::BackoffPolicy;
use super::events::DispatchFailure;
use super::pending::WorkItem;
use super::registry::{QueueRegistry, QueueState};
use crate::domain::RequestDescriptor;
use crate::error::DispatchError;
use crate::port::{Transport, TransportError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, warn};

/// State shared between the control surface and every dispatch cycle
pub(crate) struct DispatchContext {
    pub(crate) registry: Mutex<QueueRegistry>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) backoff: BackoffPolicy,
    pub(crate) events: broadcast::Sender<DispatchFailure>,
}

impl DispatchContext {
    /// Lock the registry. Never held across an `.await`.
    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueRegistry> {
        // Registry updates are single assignments, so a poisoned lock still
        // guards consistent state
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Spawn a dispatch cycle for `queue` if it is running, idle and has work
///
/// # Panics
/// Must be called from within a Tokio runtime.
pub(crate) fn kick(ctx: &Arc<DispatchContext>, name: &str, queue: &mut QueueState) {
    if !queue.running || queue.dispatching || queue.pending.is_empty() {
        return;
    }
    queue.dispatching = true;

    let ctx = Arc::clone(ctx);
    let name = name.to_string();
    let epoch = queue.epoch;
    tokio::spawn(async move {
        run_cycle(ctx, name, epoch).await;
    });
}

/// Advance the queue until it runs dry, is stopped, or disappears
///
/// `running` is only consulted once a dispatch has resolved. An advance that
/// is already pacing goes through even if the queue is stopped meanwhile.
async fn run_cycle(ctx: Arc<DispatchContext>, name: String, epoch: u64) {
    debug!(queue = %name, "Dispatch cycle started");

    loop {
        // Pacing
        let wait = {
            let registry = ctx.lock();
            let Some(queue) = registry.current(&name, epoch) else {
                debug!(queue = %name, "Queue removed, dispatch cycle abandoned");
                return;
            };
            queue.pacing_wait(Instant::now())
        };
        if !wait.is_zero() {
            debug!(queue = %name, wait_ms = wait.as_millis() as u64, "Pacing");
            sleep(wait).await;
        }

        // Pull the head; from here it can no longer be cancelled
        let item = {
            let mut registry = ctx.lock();
            let Some(queue) = registry.current_mut(&name, epoch) else {
                return;
            };
            match queue.pending.pop_front() {
                Some(item) => item,
                None => {
                    queue.dispatching = false;
                    break;
                }
            }
        };

        // In flight
        debug!(
            queue = %name,
            item_id = %item.id,
            method = %item.request.method(),
            destination = %item.request.destination(),
            "Dispatching request"
        );
        let outcome = send_isolated(&ctx.transport, &item.request).await;
        let finished_at = Instant::now();
        let extension = deliver(&ctx, &name, item, outcome);

        // Reschedule only while running and not drained
        let mut registry = ctx.lock();
        let Some(queue) = registry.current_mut(&name, epoch) else {
            return;
        };
        queue.record_dispatch(finished_at, extension);
        if !queue.running || queue.pending.is_empty() {
            queue.dispatching = false;
            break;
        }
    }

    debug!(queue = %name, "Dispatch cycle idle");
}

/// Hand the outcome to the caller; returns the backoff extension it earned
fn deliver(
    ctx: &DispatchContext,
    queue: &str,
    item: WorkItem,
    outcome: Result<serde_json::Value, TransportError>,
) -> Duration {
    match outcome {
        Ok(value) => {
            debug!(queue = %queue, item_id = %item.id, "Request completed");
            item.fulfil(value);
            Duration::ZERO
        }
        Err(error) => {
            let extension = ctx.backoff.extension(&error);
            warn!(
                queue = %queue,
                item_id = %item.id,
                error = %error,
                extension_ms = extension.as_millis() as u64,
                "Request failed in queue"
            );
            // No subscribers is fine
            let _ = ctx.events.send(DispatchFailure {
                queue: queue.to_string(),
                item_id: item.id.clone(),
                error: error.clone(),
            });
            item.fail(DispatchError::Transport(error));
            extension
        }
    }
}

/// Run the transport call on its own task so a panicking transport fails
/// the request instead of killing the cycle
pub(crate) async fn send_isolated(
    transport: &Arc<dyn Transport>,
    request: &Arc<RequestDescriptor>,
) -> Result<serde_json::Value, TransportError> {
    let transport = Arc::clone(transport);
    let request = Arc::clone(request);

    match tokio::spawn(async move { transport.send(&request).await }).await {
        Ok(outcome) => outcome,
        Err(join_err) => {
            let reason = if join_err.is_panic() {
                "transport panicked"
            } else {
                "transport task cancelled"
            };
            error!(error = ?join_err, "{}", reason);
            Err(TransportError::Request(reason.to_string()))
        }
    }
}
