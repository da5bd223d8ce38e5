use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Connection settings for a Kibana instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KibanaConfig {
    /// Base URL, e.g. `http://localhost:5601`.
    pub address: String,
    /// Basic-auth user name.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Encoded API key, sent as `Authorization: ApiKey <key>`. Takes
    /// precedence over basic auth.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// Space used when an operation does not name one.
    pub default_space: String,
}

impl Default for KibanaConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:5601".into(),
            username: None,
            password: None,
            api_key: None,
            timeout_secs: 30,
            accept_invalid_certs: false,
            default_space: "default".into(),
        }
    }
}

impl KibanaConfig {
    /// Default settings pointing at `address`.
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(raw: &str) -> ClientResult<Self> {
        toml::from_str(raw).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Check settings that would otherwise only fail at request time.
    pub fn validate(&self) -> ClientResult<()> {
        if self.address.trim().is_empty() {
            return Err(ClientError::Config("address must not be empty".into()));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ClientError::Config("password set without username".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
