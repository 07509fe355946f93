// Request Descriptor Domain Model

use crate::domain::error::DomainError;
use crate::domain::queue::{QueueName, DEFAULT_QUEUE};
use std::fmt;
use std::str::FromStr;

/// HTTP method of a dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(DomainError::InvalidMethod(s.to_string())),
        }
    }
}

/// One unit of outbound work
///
/// Built by the caller with the consuming `with_*` methods, then handed to
/// `QueueManager::enqueue`. The scheduler never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    destination: String,
    method: Method,
    headers: Vec<(String, String)>,
    payload: Option<serde_json::Value>,
    queue: QueueName,
}

impl RequestDescriptor {
    /// `destination` is either an absolute URL or a path the transport
    /// resolves against its base URL
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            method: Method::Get,
            headers: Vec::new(),
            payload: None,
            queue: DEFAULT_QUEUE.to_string(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn on_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}
