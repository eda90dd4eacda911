use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zterm_core::client::Credentials;

/// Client configuration loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub server_url: String,
    pub email: String,
    pub api_key: String,

    /// Surface desktop-style notifications in the status line
    #[serde(default)]
    pub notify: bool,

    /// Replace direct-message bodies in notifications with a generic line
    #[serde(default)]
    pub hide_private_content: bool,

    /// Where tracing output goes; relative paths land in the data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ClientConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// `<config dir>/zterm/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("No config directory for this platform")?;
        Ok(dir.join("zterm").join("config.json"))
    }

    /// Command-line flags win over file values.
    pub fn with_overrides(mut self, log_file: Option<PathBuf>, notify: bool) -> Self {
        if log_file.is_some() {
            self.log_file = log_file;
        }
        self.notify |= notify;
        self
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            server_url: self.server_url.clone(),
            email: self.email.clone(),
            api_key: self.api_key.clone(),
        }
    }
}
