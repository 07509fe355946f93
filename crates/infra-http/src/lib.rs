// PRC Dispatch Infrastructure - HTTP Adapter
// Implements: Transport (reqwest)

pub mod config;
pub mod reqwest_transport;

pub use config::{HttpTransportConfig, DEFAULT_BASE_URL};
pub use reqwest_transport::{HttpTransportError, ReqwestTransport};
