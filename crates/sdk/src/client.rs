//! PRC Client Implementation

use crate::deep_link::deep_link_from_join_code;
use crate::error::{Result, SdkError};
use crate::types::{DeepLinkFormat, ServerInfo};
use prc_dispatch_core::{Method, QueueManager, RequestDescriptor, DEFAULT_QUEUE};
use serde_json::json;
use tracing::debug;

const SERVER_ENDPOINT: &str = "v1/server";
const COMMAND_ENDPOINT: &str = "v1/server/command";

/// Entry point to the private-server API
///
/// Requests are not sent directly: they are enqueued on the wrapped
/// `QueueManager`, which paces them per queue. Queues start stopped, so
/// start the ones you use.
///
/// # Example
///
/// ```no_run
/// use prc_dispatch_core::QueueManager;
/// use prc_dispatch_sdk::PrcClient;
/// # use std::sync::Arc;
///
/// # async fn example(transport: Arc<dyn prc_dispatch_core::Transport>) -> Result<(), Box<dyn std::error::Error>> {
/// let manager = QueueManager::with_transport(transport);
/// manager.start("main");
///
/// let client = PrcClient::new(manager, None);
/// let server = client.private_server("server-key")?;
/// println!("{}", server.get_info(None).await?.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PrcClient {
    manager: QueueManager,
    authorization_key: Option<String>,
}

impl PrcClient {
    /// `authorization_key` is the optional application key for large apps
    pub fn new(manager: QueueManager, authorization_key: Option<String>) -> Self {
        Self {
            manager,
            authorization_key,
        }
    }

    pub fn manager(&self) -> &QueueManager {
        &self.manager
    }

    /// Headers sent with every request for `server_key`
    pub fn headers(&self, server_key: &str) -> Vec<(String, String)> {
        let mut headers = vec![("Server-Key".to_string(), server_key.to_string())];
        if let Some(key) = &self.authorization_key {
            headers.push(("Authorization".to_string(), key.clone()));
        }
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        headers.push(("Accept".to_string(), "*/*".to_string()));
        headers
    }

    /// Handle for one private server
    ///
    /// # Errors
    /// - SdkError::InvalidServerKey if the key is empty
    pub fn private_server(&self, server_key: impl Into<String>) -> Result<PrivateServer> {
        let server_key = server_key.into();
        if server_key.trim().is_empty() {
            return Err(SdkError::InvalidServerKey);
        }
        Ok(PrivateServer {
            client: self.clone(),
            server_key,
            default_queue: DEFAULT_QUEUE.to_string(),
        })
    }
}

/// One private server, addressed by its server key
#[derive(Clone)]
pub struct PrivateServer {
    client: PrcClient,
    server_key: String,
    default_queue: String,
}

impl PrivateServer {
    pub fn server_key(&self) -> &str {
        &self.server_key
    }

    /// Queue used when a call does not name one
    pub fn default_queue(&self) -> &str {
        &self.default_queue
    }

    pub fn set_default_queue(&mut self, queue: impl Into<String>) {
        self.default_queue = queue.into();
    }

    /// Describe a call to `endpoint` with this server's headers
    pub fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<serde_json::Value>,
        queue: Option<&str>,
    ) -> RequestDescriptor {
        let mut request = RequestDescriptor::new(endpoint)
            .with_method(method)
            .on_queue(queue.unwrap_or(&self.default_queue));
        for (name, value) in self.client.headers(&self.server_key) {
            request = request.with_header(name, value);
        }
        if let Some(body) = body {
            request = request.with_payload(body);
        }
        request
    }

    /// Enqueue a request and wait for its decoded body
    pub async fn send(&self, request: RequestDescriptor) -> Result<serde_json::Value> {
        let pending = self.client.manager.enqueue(request)?;
        debug!(queue = %pending.queue(), item_id = %pending.id(), "Waiting for API response");
        Ok(pending.await?)
    }

    /// Send a request immediately, skipping its queue's pacing and capacity
    pub async fn send_now(&self, request: RequestDescriptor) -> Result<serde_json::Value> {
        Ok(self.client.manager.send_now(request).await?)
    }

    /// `GET v1/server`
    pub async fn get_info(&self, queue: Option<&str>) -> Result<ServerInfo> {
        let value = self
            .send(self.request(SERVER_ENDPOINT, Method::Get, None, queue))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Run an in-game command, e.g. `h Hello` or `:h Hello`
    pub async fn send_command(&self, command: &str, queue: Option<&str>) -> Result<()> {
        let command = if command.starts_with(':') {
            command.to_string()
        } else {
            format!(":{}", command)
        };
        let body = json!({ "command": command });

        self.send(self.request(COMMAND_ENDPOINT, Method::Post, Some(body), queue))
            .await?;
        Ok(())
    }

    /// Join link built from the server's current join code
    pub async fn deep_link(&self, format: DeepLinkFormat, queue: Option<&str>) -> Result<String> {
        let info = self.get_info(queue).await?;
        Ok(deep_link_from_join_code(&info.join_code, format))
    }
}
