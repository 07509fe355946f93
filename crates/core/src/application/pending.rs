// Work items and their single-resolution completion handles

use crate::domain::RequestDescriptor;
use crate::error::DispatchError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// What a pending result resolves to
pub type DispatchOutcome = Result<serde_json::Value, DispatchError>;

/// One enqueued request plus the sender half of its completion channel
pub(crate) struct WorkItem {
    pub(crate) id: String,
    pub(crate) request: Arc<RequestDescriptor>,
    completion: oneshot::Sender<DispatchOutcome>,
}

impl WorkItem {
    pub(crate) fn new(id: String, request: RequestDescriptor) -> (Self, PendingResult) {
        let (tx, rx) = oneshot::channel();
        let pending = PendingResult {
            id: id.clone(),
            queue: request.queue().to_string(),
            rx,
        };
        let item = Self {
            id,
            request: Arc::new(request),
            completion: tx,
        };
        (item, pending)
    }

    pub(crate) fn fulfil(self, value: serde_json::Value) {
        self.resolve(Ok(value));
    }

    pub(crate) fn fail(self, error: DispatchError) {
        self.resolve(Err(error));
    }

    // Consuming `self` makes a second resolution impossible
    fn resolve(self, outcome: DispatchOutcome) {
        // The caller may have dropped its handle; nothing left to deliver to
        let _ = self.completion.send(outcome);
    }
}

/// Handle to the eventual outcome of an enqueued request
///
/// Resolves exactly once: with the transport's decoded value, or with the
/// error that removed or failed the request.
#[derive(Debug)]
pub struct PendingResult {
    id: String,
    queue: String,
    rx: oneshot::Receiver<DispatchOutcome>,
}

impl PendingResult {
    /// Work item ID, as carried by diagnostic events
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}

impl Future for PendingResult {
    type Output = DispatchOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(DispatchError::Abandoned)))
    }
}
