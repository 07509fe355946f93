//! Application configuration
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. a TOML file (`--config <path>`, or `prc-dispatch.toml` if present)
//! 3. `PRC_DISPATCH_*` environment variables, `__` between nested keys
//!    (e.g. `PRC_DISPATCH_HTTP__TIMEOUT_SECS=10`)

use anyhow::{Context, Result};
use ::config::{Config as ConfigBuilder, Environment, File, FileFormat};
use prc_dispatch_core::domain::{validate_queue_name, DEFAULT_PACE_INTERVAL};
use prc_dispatch_core::{Capacity, QueueConfig};
use prc_dispatch_infra_http::HttpTransportConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "prc-dispatch.toml";
const ENV_PREFIX: &str = "PRC_DISPATCH";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Queue {name:?} is invalid: {reason}")]
    InvalidQueue { name: String, reason: String },

    #[error("Queue {0:?} is configured more than once")]
    DuplicateQueue(String),

    #[error("http.timeout_secs must be greater than 0")]
    ZeroTimeout,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpTransportConfig,
    pub queues: Vec<QueueSettings>,
}

/// One `[[queues]]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueueSettings {
    pub name: String,
    #[serde(default = "default_pace_interval_ms")]
    pub pace_interval_ms: u64,
    /// Maximum pending requests; negative means unbounded
    #[serde(default = "default_capacity")]
    pub capacity: i64,
}

fn default_pace_interval_ms() -> u64 {
    DEFAULT_PACE_INTERVAL.as_millis() as u64
}

fn default_capacity() -> i64 {
    -1
}

impl QueueSettings {
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig::new(
            Duration::from_millis(self.pace_interval_ms),
            Capacity::from_limit(self.capacity),
        )
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        match config_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            }
            None => {
                builder = builder.add_source(
                    File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
                );
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: AppConfig = ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .context("Failed to parse TOML configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut seen = HashSet::new();
        for queue in &self.queues {
            validate_queue_name(&queue.name).map_err(|e| ConfigError::InvalidQueue {
                name: queue.name.clone(),
                reason: e.to_string(),
            })?;
            if !seen.insert(queue.name.as_str()) {
                return Err(ConfigError::DuplicateQueue(queue.name.clone()));
            }
        }
        Ok(())
    }

    /// Settings for `name`, if configured
    pub fn queue(&self, name: &str) -> Option<&QueueSettings> {
        self.queues.iter().find(|q| q.name == name)
    }
}
