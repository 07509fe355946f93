// Reqwest transport implementation
// reason: reqwest for HTTPS + JSON, shared connection pool per transport
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use prc_dispatch_core::domain::{Method, RequestDescriptor};
use prc_dispatch_core::port::{ErrorBody, ResponseNotOk, Transport, TransportError};

use crate::config::HttpTransportConfig;

const INVALID_JSON_MESSAGE: &str =
    "Expected JSON response from server, did not receive it. This is usually a server error.";

/// Errors building a `ReqwestTransport`
#[derive(Error, Debug)]
pub enum HttpTransportError {
    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Transport that performs real HTTP calls
///
/// Destinations starting with `http://` or `https://` are used as-is; any
/// other destination is joined onto the configured base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport from configuration
    ///
    /// # Example
    /// ```ignore
    /// let transport = ReqwestTransport::new(&HttpTransportConfig::default())?;
    /// ```
    pub fn new(config: &HttpTransportConfig) -> Result<Self, HttpTransportError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| HttpTransportError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        debug!(base_url = %base_url, timeout_secs = config.timeout_secs, "HTTP transport ready");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, destination: &str) -> Result<Url, TransportError> {
        let resolved = if destination.starts_with("http://") || destination.starts_with("https://")
        {
            Url::parse(destination)
        } else {
            self.base_url.join(destination)
        };
        resolved.map_err(|e| TransportError::Request(format!("invalid URL {:?}: {}", destination, e)))
    }

    async fn not_ok(response: reqwest::Response) -> ResponseNotOk {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut not_ok = ResponseNotOk::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
        );
        if let Some(retry_after) = retry_after {
            not_ok = not_ok.with_retry_after(retry_after);
        }
        // Error bodies are optional and not always JSON
        if let Ok(body) = response.json::<ErrorBody>().await {
            not_ok = not_ok.with_body(body);
        }
        not_ok
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<serde_json::Value, TransportError> {
        let url = self.resolve(request.destination())?;
        debug!(method = %request.method(), url = %url, "Sending HTTP request");

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method()), url);
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = request.payload() {
            builder = builder.json(payload);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let not_ok = Self::not_ok(response).await;
            debug!(
                status = not_ok.status,
                retry_after = ?not_ok.retry_after,
                error_code = ?not_ok.error_code(),
                "Non-success response"
            );
            return Err(TransportError::NotOk(not_ok));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|_| TransportError::InvalidBody(INVALID_JSON_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    /// Serve a fixture API on a random local port, returning its base URL
    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/v1/server", get(|| async { Json(json!({"Name": "Test Server"})) }))
            .route(
                "/v1/server/command",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    Json(json!({
                        "serverKey": headers.get("server-key").and_then(|v| v.to_str().ok()),
                        "contentType": headers.get("content-type").and_then(|v| v.to_str().ok()),
                        "received": body,
                    }))
                }),
            )
            .route(
                "/limited",
                get(|| async {
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        [("retry-after", "2")],
                        Json(json!({"code": 4001, "message": "You are being rate limited!"})),
                    )
                }),
            )
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
            )
            .route("/text", get(|| async { "definitely not json" }));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = format!("http://{}/", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to start test server");
        });
        address
    }

    fn transport(base_url: &str) -> ReqwestTransport {
        ReqwestTransport::new(&HttpTransportConfig::default().with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_get_decodes_json() {
        let transport = transport(&spawn_server().await);

        let value = transport
            .send(&RequestDescriptor::new("v1/server"))
            .await
            .unwrap();
        assert_eq!(value, json!({"Name": "Test Server"}));
    }

    #[tokio::test]
    async fn test_post_sends_headers_and_json_body() {
        let transport = transport(&spawn_server().await);
        let request = RequestDescriptor::new("v1/server/command")
            .with_method(Method::Post)
            .with_header("Server-Key", "abc123")
            .with_header("Content-Type", "application/json")
            .with_payload(json!({"command": ":h hello"}));

        let value = transport.send(&request).await.unwrap();
        assert_eq!(value["serverKey"], "abc123");
        assert_eq!(value["contentType"], "application/json");
        assert_eq!(value["received"], json!({"command": ":h hello"}));
    }

    #[tokio::test]
    async fn test_absolute_destination_bypasses_base_url() {
        let server = spawn_server().await;
        let transport = transport("https://unused.invalid/");

        let value = transport
            .send(&RequestDescriptor::new(format!("{}v1/server", server)))
            .await
            .unwrap();
        assert_eq!(value["Name"], "Test Server");
    }

    #[tokio::test]
    async fn test_rate_limit_carries_retry_after_and_body() {
        let transport = transport(&spawn_server().await);

        let err = transport
            .send(&RequestDescriptor::new("limited"))
            .await
            .unwrap_err();
        let response = err.as_not_ok().expect("expected NotOk");
        assert!(response.is_rate_limited());
        assert_eq!(response.retry_after.as_deref(), Some("2"));
        assert_eq!(response.retry_after_secs(), Some(2.0));
        assert_eq!(response.error_code(), Some(4001));
        assert_eq!(response.status_text, "Too Many Requests");
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_ignored() {
        let transport = transport(&spawn_server().await);

        let err = transport
            .send(&RequestDescriptor::new("broken"))
            .await
            .unwrap_err();
        let response = err.as_not_ok().expect("expected NotOk");
        assert!(response.is_server_error());
        assert!(response.body.is_none());
        assert!(response.retry_after.is_none());
    }

    #[tokio::test]
    async fn test_success_without_json_is_invalid_body() {
        let transport = transport(&spawn_server().await);

        let err = transport
            .send(&RequestDescriptor::new("text"))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::InvalidBody(INVALID_JSON_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        // Grab a free port, then close it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let err = transport(&address)
            .send(&RequestDescriptor::new("v1/server"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = ReqwestTransport::new(&HttpTransportConfig::default().with_base_url("not a url"))
            .unwrap_err();
        assert!(matches!(err, HttpTransportError::InvalidBaseUrl { .. }));
    }
}
