// Transport Port
// Abstraction for issuing one HTTP call and decoding its JSON body

use crate::domain::RequestDescriptor;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Error body some APIs attach to non-success responses
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A response whose status was outside 200-299
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseNotOk {
    pub status: u16,
    pub status_text: String,
    pub body: Option<ErrorBody>,
    /// Raw `retry-after` header, if the server sent one
    pub retry_after: Option<String>,
}

impl ResponseNotOk {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: None,
            retry_after: None,
        }
    }

    pub fn with_body(mut self, body: ErrorBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_retry_after(mut self, retry_after: impl Into<String>) -> Self {
        self.retry_after = Some(retry_after.into());
        self
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    pub fn error_code(&self) -> Option<i64> {
        self.body.as_ref().and_then(|b| b.code)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| b.message.as_deref())
    }

    /// `retry-after` interpreted as seconds
    ///
    /// Returns `None` when the header is absent or is not a finite,
    /// non-negative number (HTTP-date values are not honoured).
    pub fn retry_after_secs(&self) -> Option<f64> {
        self.retry_after
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
    }
}

impl fmt::Display for ResponseNotOk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received {} ({}), expected a response between 200-299",
            self.status, self.status_text
        )?;
        if let Some(message) = self.error_message() {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

/// Transport failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Network-level or otherwise unclassified failure
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Response not OK: {0}")]
    NotOk(ResponseNotOk),

    /// Success status, but the body was not the expected JSON
    #[error("Response received from server was not what was expected: {0}")]
    InvalidBody(String),
}

impl TransportError {
    pub fn as_not_ok(&self) -> Option<&ResponseNotOk> {
        match self {
            TransportError::NotOk(response) => Some(response),
            _ => None,
        }
    }
}

/// Transport trait
///
/// Implementations:
/// - ReqwestTransport (infra-http): real HTTPS calls
/// - ScriptedTransport (mocks): canned outcomes for tests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and decode the response body as JSON
    ///
    /// # Errors
    /// - TransportError::Request if the call could not be made
    /// - TransportError::NotOk if the status was not 2xx
    /// - TransportError::InvalidBody if a 2xx body was not JSON
    async fn send(&self, request: &RequestDescriptor)
        -> Result<serde_json::Value, TransportError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Outcome of one scripted call
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Respond with `{"destination": <request destination>}`
        Echo,
        /// Respond with the given value
        Respond(serde_json::Value),
        /// Fail with the given error
        Fail(TransportError),
        /// Panic with message (for isolation testing)
        Panic(String),
    }

    /// One call observed by the mock
    #[derive(Debug, Clone)]
    pub struct DispatchRecord {
        pub destination: String,
        pub queue: String,
        pub started_at: Instant,
        pub finished_at: Instant,
    }

    /// Transport that plays back a script, then falls back to `Echo`
    pub struct ScriptedTransport {
        script: Mutex<VecDeque<MockBehavior>>,
        latency: Duration,
        records: Mutex<Vec<DispatchRecord>>,
    }

    impl ScriptedTransport {
        pub fn new_success() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                latency: Duration::ZERO,
                records: Mutex::new(Vec::new()),
            }
        }

        /// Every call takes `latency` before resolving
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        /// Append a behavior for the next unscripted call
        pub fn then(self, behavior: MockBehavior) -> Self {
            self.push(behavior);
            self
        }

        pub fn push(&self, behavior: MockBehavior) {
            self.script.lock().unwrap().push_back(behavior);
        }

        pub fn call_count(&self) -> usize {
            self.records.lock().unwrap().len()
        }

        pub fn records(&self) -> Vec<DispatchRecord> {
            self.records.lock().unwrap().clone()
        }

        /// Destinations in the order they were sent
        pub fn destinations(&self) -> Vec<String> {
            self.records()
                .into_iter()
                .map(|r| r.destination)
                .collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            request: &RequestDescriptor,
        ) -> Result<serde_json::Value, TransportError> {
            let started_at = Instant::now();
            let behavior = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(MockBehavior::Echo);

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            self.records.lock().unwrap().push(DispatchRecord {
                destination: request.destination().to_string(),
                queue: request.queue().to_string(),
                started_at,
                finished_at: Instant::now(),
            });

            match behavior {
                MockBehavior::Echo => Ok(serde_json::json!({
                    "destination": request.destination(),
                })),
                MockBehavior::Respond(value) => Ok(value),
                MockBehavior::Fail(error) => Err(error),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for isolation testing
                }
            }
        }
    }
}
