// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod transport;

// Re-exports
pub use id_provider::{IdProvider, SequentialIdProvider, UuidProvider};
pub use transport::{ErrorBody, ResponseNotOk, Transport, TransportError};
