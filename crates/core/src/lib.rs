// PRC Dispatch Core - Request Scheduler, Domain & Ports
// NO infrastructure dependencies (hexagonal architecture): the HTTP transport
// is plugged in through `port::Transport`

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{
    DispatchFailure, ManagerConfig, PendingResult, QueueManager, QueueSnapshot,
};
pub use domain::{Capacity, Method, QueueConfig, RequestDescriptor, DEFAULT_QUEUE};
pub use error::{DispatchError, Result};
pub use port::{ErrorBody, ResponseNotOk, Transport, TransportError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
