// Central Error Type for the Scheduler

use crate::port::TransportError;
use thiserror::Error;

/// Failure delivered to the caller of `QueueManager::enqueue`
///
/// Each enqueued request resolves exactly once, either with the transport's
/// decoded value or with one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// Admission error: the queue already holds `capacity` pending requests
    #[error("The maximum request queue limit ({capacity}) for queue {queue} has been reached and further requests to it will be dropped")]
    QueueFull { queue: String, capacity: usize },

    /// Cancellation error: the request left the queue before being sent
    #[error("{}", removal_message(.cleared))]
    RemovedFromQueue { cleared: bool },

    #[error("Dispatch failed: {0}")]
    Transport(#[from] TransportError),

    /// Misuse error: invalid arguments to a control-surface operation
    #[error("Invalid argument: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Request was abandoned before a result was delivered")]
    Abandoned,
}

fn removal_message(cleared: &bool) -> &'static str {
    if *cleared {
        "Queue was cleared, removing this request from the queue"
    } else {
        "Request was removed from the queue"
    }
}

impl DispatchError {
    pub fn is_queue_full(&self) -> bool {
        matches!(self, DispatchError::QueueFull { .. })
    }

    /// `Some(true)` for a batch clear, `Some(false)` for an explicit removal
    pub fn removal_cleared(&self) -> Option<bool> {
        match self {
            DispatchError::RemovedFromQueue { cleared } => Some(*cleared),
            _ => None,
        }
    }

    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            DispatchError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias using DispatchError
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_full_message_names_queue_and_capacity() {
        let err = DispatchError::QueueFull {
            queue: "main".to_string(),
            capacity: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("(2)"));
        assert!(msg.contains("main"));
        assert!(err.is_queue_full());
    }

    #[test]
    fn test_removal_messages_distinguish_clear_from_explicit() {
        let cleared = DispatchError::RemovedFromQueue { cleared: true };
        let explicit = DispatchError::RemovedFromQueue { cleared: false };

        assert!(cleared.to_string().contains("cleared"));
        assert!(!explicit.to_string().contains("cleared"));
        assert_eq!(cleared.removal_cleared(), Some(true));
        assert_eq!(explicit.removal_cleared(), Some(false));
        assert_eq!(DispatchError::Abandoned.removal_cleared(), None);
    }
}
