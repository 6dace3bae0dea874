//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub slack: SlackConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlackConfig {
    pub api_base: String,
    pub timeout_seconds: u64,
}

/// Identity used by the local console REPL
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub team_id: String,
    pub team_name: String,
    pub user_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "cardswap-bot".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from("cardswap.db"),
            },
            slack: SlackConfig {
                api_base: "https://slack.com/api".to_string(),
                timeout_seconds: 5,
            },
            console: ConsoleConfig {
                team_id: "TCONSOLE".to_string(),
                team_name: "Console".to_string(),
                user_id: "UCONSOLE".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slack.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue("slack.timeout-seconds must be positive".to_string()));
        }
        if self.console.team_id.trim().is_empty() {
            return Err(ConfigError::MissingField("console.team-id".to_string()));
        }
        if self.console.user_id.trim().is_empty() {
            return Err(ConfigError::MissingField("console.user-id".to_string()));
        }
        Ok(())
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database.path = PathBuf::from(path);
        }

        if let Ok(base) = std::env::var("SLACK_API_BASE") {
            config.slack.api_base = base;
        }

        if let Some(timeout) = std::env::var("SLACK_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|t| *t > 0)
        {
            config.slack.timeout_seconds = timeout;
        }

        config
    }
}
