// Domain Layer - Pure value types

pub mod error;
pub mod queue;
pub mod request;

// Re-exports
pub use error::DomainError;
pub use queue::{
    validate_queue_name, Capacity, QueueConfig, QueueName, DEFAULT_PACE_INTERVAL, DEFAULT_QUEUE,
};
pub use request::{Method, RequestDescriptor};
