use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub database: DatabaseConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub timeout_seconds: u64,
    pub endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig {
                bot_token: String::new(),
            },
            database: DatabaseConfig {
                path: "hostwatch.db".to_string(),
            },
            probe: ProbeConfig {
                timeout_seconds: 10,
                endpoint: "/get_info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load the config file, writing a default template when it does not exist yet
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            anyhow::bail!(
                "Created default config at {}; fill in telegram.bot_token and restart",
                path
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        // Validate required fields
        if config.telegram.bot_token.is_empty() {
            return Err(anyhow::anyhow!("telegram.bot_token is required in config"));
        }
        if config.probe.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("probe.timeout_seconds must be positive"));
        }

        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_probe_settings() {
        let config = Config::default();
        assert_eq!(config.probe.timeout_seconds, 10);
        assert_eq!(config.probe.endpoint, "/get_info");
    }

    #[test]
    fn test_load_rejects_empty_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let path_str = path.to_str().unwrap();

        Config::default().save(path_str).unwrap();
        let err = Config::load(path_str).unwrap_err();
        assert!(err.to_string().contains("bot_token"));
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let path_str = path.to_str().unwrap();

        let mut config = Config::default();
        config.telegram.bot_token = "123:abc".to_string();
        config.save(path_str).unwrap();

        let loaded = Config::load(path_str).unwrap();
        assert_eq!(loaded.telegram.bot_token, "123:abc");
        assert_eq!(loaded.database.path, "hostwatch.db");
    }
}
