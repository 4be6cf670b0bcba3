//! Configuration management for bouncer-bot

#[path = "config_tests.rs"]
mod config_tests;

use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Complete bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
}

/// Discord-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal
    #[serde(default = "default_bot_token")]
    pub bot_token: String,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_impl(&SystemEnv)
    }

    pub(crate) fn from_env_impl(env: &impl ReadEnv) -> Result<Self> {
        let bot_token = env
            .var("DISCORD_BOT_TOKEN")
            .context("DISCORD_BOT_TOKEN not set")?;

        Ok(Config {
            discord: DiscordConfig { bot_token },
        })
    }
}

/// Environment access seam so tests can inject variables.
pub(crate) trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
pub(crate) struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

fn default_bot_token() -> String {
    std::env::var("DISCORD_BOT_TOKEN").unwrap_or_default()
}
