// Queue Domain Model

use crate::domain::error::{DomainError, Result};
use std::fmt;
use std::time::Duration;

/// Queue identifier
pub type QueueName = String;

/// Queue a request lands in when the caller does not name one
pub const DEFAULT_QUEUE: &str = "main";

/// Minimum gap between the end of one dispatch and the start of the next (250ms)
pub const DEFAULT_PACE_INTERVAL: Duration = Duration::from_millis(250);

const MAX_QUEUE_NAME_LEN: usize = 64;

/// Maximum number of pending requests a queue accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capacity {
    #[default]
    Unbounded,
    Bounded(usize),
}

impl Capacity {
    /// Map the "negative means unbounded" convention used in config files
    pub fn from_limit(limit: i64) -> Self {
        if limit < 0 {
            Capacity::Unbounded
        } else {
            Capacity::Bounded(limit as usize)
        }
    }

    /// Configured maximum, `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        match self {
            Capacity::Unbounded => None,
            Capacity::Bounded(max) => Some(*max),
        }
    }

    /// True when a queue holding `pending` requests cannot take another
    pub fn is_full(&self, pending: usize) -> bool {
        match self {
            Capacity::Unbounded => false,
            Capacity::Bounded(max) => pending >= *max,
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Unbounded => write!(f, "unbounded"),
            Capacity::Bounded(max) => write!(f, "{}", max),
        }
    }
}

/// Per-queue configuration, fixed when the queue is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub pace_interval: Duration,
    pub capacity: Capacity,
}

impl QueueConfig {
    pub fn new(pace_interval: Duration, capacity: Capacity) -> Self {
        Self {
            pace_interval,
            capacity,
        }
    }

    pub fn with_pace_interval(mut self, pace_interval: Duration) -> Self {
        self.pace_interval = pace_interval;
        self
    }

    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PACE_INTERVAL, Capacity::Unbounded)
    }
}

/// Validate a queue name
///
/// Names are 1-64 characters of ASCII alphanumerics or `_ - . :`.
pub fn validate_queue_name(name: &str) -> Result<()> {
    let invalid = |reason: &'static str| DomainError::InvalidQueueName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > MAX_QUEUE_NAME_LEN {
        return Err(invalid("too long (max 64 characters)"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
    {
        return Err(invalid("must be alphanumeric or one of '_', '-', '.', ':'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_queue_name_empty() {
        let result = validate_queue_name("");
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_queue_name_too_long() {
        let result = validate_queue_name(&"a".repeat(65));
        assert!(result.unwrap_err().to_string().contains("too long"));
        assert!(validate_queue_name(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_queue_name_invalid_chars() {
        let result = validate_queue_name("invalid@queue!");
        assert!(result.unwrap_err().to_string().contains("alphanumeric"));
    }

    #[test]
    fn test_validate_queue_name_valid() {
        assert!(validate_queue_name("main").is_ok());
        assert!(validate_queue_name("server:abc-1.commands_x").is_ok());
    }

    #[test]
    fn test_capacity_from_limit() {
        assert_eq!(Capacity::from_limit(-1), Capacity::Unbounded);
        assert_eq!(Capacity::from_limit(0), Capacity::Bounded(0));
        assert_eq!(Capacity::from_limit(5), Capacity::Bounded(5));
    }

    #[test]
    fn test_capacity_limit() {
        assert_eq!(Capacity::Bounded(3).limit(), Some(3));
        assert_eq!(Capacity::Bounded(0).limit(), Some(0));
        assert_eq!(Capacity::Unbounded.limit(), None);
    }

    #[test]
    fn test_capacity_is_full() {
        assert!(!Capacity::Unbounded.is_full(usize::MAX));
        assert!(!Capacity::Bounded(2).is_full(1));
        assert!(Capacity::Bounded(2).is_full(2));
        assert!(Capacity::Bounded(0).is_full(0));
    }

    #[test]
    fn test_default_queue_config() {
        let config = QueueConfig::default();
        assert_eq!(config.pace_interval, Duration::from_millis(250));
        assert_eq!(config.capacity, Capacity::Unbounded);
    }
}
