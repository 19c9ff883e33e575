// Configuration file loading

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// PRD builder configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Agent service settings
    #[serde(default)]
    pub agent: AgentConfig,
    /// Upload service settings
    #[serde(default)]
    pub uploads: UploadConfig,
}

/// Agent service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the agent service
    #[serde(rename = "baseUrl", alias = "base_url", default = "default_agent_base_url")]
    pub base_url: String,
    /// Agent identifier to converse with
    #[serde(rename = "agentId", alias = "agent_id", default = "default_agent_id")]
    pub agent_id: String,
}

fn default_agent_base_url() -> String { "http://localhost:8080/api".to_string() }
fn default_agent_id() -> String { "69976ea431f64502bf319c80".to_string() }

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: default_agent_base_url(),
            agent_id: default_agent_id(),
        }
    }
}

/// Upload service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Base URL of the asset upload service; defaults to the agent's host
    #[serde(rename = "baseUrl", alias = "base_url", default = "default_upload_base_url")]
    pub base_url: String,
}

fn default_upload_base_url() -> String { "http://localhost:8080/api".to_string() }

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: default_upload_base_url(),
        }
    }
}

/// Config loader
pub struct ConfigLoader {
    /// Global config path
    global_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            global_path: Self::get_global_config_path(),
        }
    }

    /// Get the global config path
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prd-builder").join("config.toml"))
    }

    /// Load global config
    pub fn load_global(&self) -> Result<Option<AppConfig>> {
        if let Some(ref path) = self.global_path {
            self.load_from_path(path)
        } else {
            Ok(None)
        }
    }

    /// Load config from a specific path
    pub fn load_from_path(&self, path: &Path) -> Result<Option<AppConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        self.validate_config(&config)?;

        Ok(Some(config))
    }

    /// Validate config values
    fn validate_config(&self, config: &AppConfig) -> Result<()> {
        for (name, url) in [
            ("agent.baseUrl", &config.agent.base_url),
            ("uploads.baseUrl", &config.uploads.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }

        if config.agent.agent_id.trim().is_empty() {
            return Err(anyhow!("agent.agentId cannot be empty"));
        }

        Ok(())
    }

    /// Check if global config exists
    pub fn global_config_exists(&self) -> bool {
        self.global_path.as_ref().map(|p| p.exists()).unwrap_or(false)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
