//! PRC Dispatch SDK - Police Roleplay Community private-server API
//!
//! Maps the private-server endpoints onto requests scheduled by
//! `prc-dispatch-core`, so every call is paced by its queue.
//!
//! # Example
//!
//! ```no_run
//! use prc_dispatch_core::QueueManager;
//! use prc_dispatch_infra_http::{HttpTransportConfig, ReqwestTransport};
//! use prc_dispatch_sdk::{DeepLinkFormat, PrcClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ReqwestTransport::new(&HttpTransportConfig::default())?;
//!     let manager = QueueManager::with_transport(Arc::new(transport));
//!     manager.start("main");
//!
//!     let server = PrcClient::new(manager, None).private_server("server-key")?;
//!     server.send_command("h Hello from the API", None).await?;
//!     println!("{}", server.deep_link(DeepLinkFormat::Direct, None).await?);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod deep_link;
mod error;
mod types;

pub use client::{PrcClient, PrivateServer};
pub use deep_link::{deep_link_from_join_code, PLACE_ID};
pub use error::{Result, SdkError};
pub use types::{AccountVerificationRequirement, DeepLinkFormat, PermissionLevel, ServerInfo};
