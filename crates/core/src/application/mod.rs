// Application Layer - Queue scheduling and dispatch

mod backoff;
mod constants;
mod dispatcher;
mod events;
mod pending;
mod queue_manager;
mod registry;

// Re-exports
pub use backoff::BackoffPolicy;
pub use constants::DEFAULT_EVENT_CAPACITY;
pub use events::DispatchFailure;
pub use pending::{DispatchOutcome, PendingResult};
pub use queue_manager::{ManagerConfig, QueueManager};
pub use registry::QueueSnapshot;
