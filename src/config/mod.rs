//! Configuration management.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → toml/serde (parse & deserialize, defaults for absent fields)
//!     → AppConfig (immutable)
//!     → shared by value to the subsystems that need it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no reload path exists
//! - All fields have defaults so a missing file still boots the demo
//! - The core consumes configuration, it does not define loading policy

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Snowflake id generation settings.
    pub snowflake: SnowflakeConfig,

    /// Guard-chain execution settings.
    pub dispatch: DispatchConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g. "127.0.0.1:3000").
    pub bind_address: String,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Snowflake generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SnowflakeConfig {
    /// Node identifier, unique per process in a deployment (10 bits used).
    pub node_id: u16,
}

/// Guard-chain execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Budget for a single guard invocation, in milliseconds.
    pub guard_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            guard_timeout_ms: 5_000,
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
