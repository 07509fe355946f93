// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid queue name {name:?}: {reason}")]
    InvalidQueueName { name: String, reason: &'static str },

    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
