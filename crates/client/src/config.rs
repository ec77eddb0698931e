//! Client configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use perimeter_common::{Error, Result};

/// Configuration for reaching a provider host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Provider host endpoint
    pub endpoint: String,

    /// Tenant network slug, e.g. "autoco"
    pub network: Option<String>,

    /// API token attached to every call as bearer authorization
    pub api_token: Option<String>,

    /// Request timeout in seconds
    pub http_timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:50051".to_string(),
            network: None,
            api_token: None,
            http_timeout: 10,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file. An absent file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))?;
            toml::from_str(&content)
                .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))
        } else {
            Ok(Self::default())
        }
    }

    /// Defaults overridden by PERIMETER_* environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply PERIMETER_* environment variable overrides in place
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(endpoint) = std::env::var("PERIMETER_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(network) = std::env::var("PERIMETER_NETWORK") {
            self.network = Some(network);
        }
        if let Ok(token) = std::env::var("PERIMETER_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Ok(timeout) = std::env::var("PERIMETER_HTTP_TIMEOUT") {
            self.http_timeout = parse_timeout(&timeout)?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

fn parse_timeout(value: &str) -> Result<u64> {
    value.parse().map_err(|_| {
        Error::InvalidConfig(format!(
            "PERIMETER_HTTP_TIMEOUT must be a number of seconds, got \"{value}\""
        ))
    })
}
