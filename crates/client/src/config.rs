//! Client configuration

#![allow(dead_code)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use dayflow_common::views::LeavePolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub leave: LeavePolicy,
    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    pub fn load(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        Ok(config)
    }

    pub fn save(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("dev", "dayflow", "dayflow") {
            dirs.config_dir().join("dayflow.toml")
        } else {
            PathBuf::from("dayflow.toml")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL including the `/api` prefix.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Session database path; platform data dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageSettings {
    pub fn session_db_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        if let Some(dirs) = directories::ProjectDirs::from("dev", "dayflow", "dayflow") {
            dirs.data_dir().join("session.db")
        } else {
            PathBuf::from("session.db")
        }
    }
}

pub fn generate_example_config() -> String {
    let config = ClientConfig::default();
    toml::to_string_pretty(&config).expect("Failed to serialize default config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.leave.annual_allowance, 12);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let config: ClientConfig = toml::from_str(
            "[api]\nbase_url = \"https://hr.example.com/api\"\ntimeout_secs = 10\n\n[leave]\nannual_allowance = 20\n",
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://hr.example.com/api");
        assert_eq!(config.leave.annual_allowance, 20);
        // Weekend falls back to the default pair.
        assert_eq!(config.leave.weekend.len(), 2);
    }

    #[test]
    fn example_config_round_trips() {
        let example = generate_example_config();
        let parsed: ClientConfig = toml::from_str(&example).unwrap();
        assert_eq!(parsed.api.timeout_secs, 30);
    }
}
