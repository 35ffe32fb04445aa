//! Client configuration

use crate::Result;
use serde::{Deserialize, Serialize};

/// Client configuration
///
/// Connection settings for the fetch collaborator, stored in JSON format.
///
/// # Example
/// ```rust,no_run
/// use chatsync::config::ClientConfig;
///
/// // Load configuration (returns defaults if the file doesn't exist)
/// let config = ClientConfig::load("chatsync.json").expect("Failed to load");
/// println!("Backend at {}", config.server_addr);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Backend address (host:port)
    pub server_addr: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl ClientConfig {
    /// Load configuration from a JSON file
    ///
    /// Returns defaults if the file doesn't exist or is empty.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:4000".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}
