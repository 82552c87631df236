mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SuitcastError;
use defaults::*;

/// Top-level suitcast configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for daily-rolling log files. Unset = stdout only.
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Timeout for sendMessage / editMessageText calls.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    /// Long-poll duration passed to getUpdates.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: default_api_base(),
            send_timeout_secs: default_send_timeout_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

/// Where round messages come from and where predictions go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// The only chat whose posts feed the engine.
    #[serde(default)]
    pub source_channel: i64,
    /// Default prediction destinations.
    #[serde(default)]
    pub destinations: Vec<i64>,
    /// Upper bound on the destination set, including `/redirect` overrides.
    #[serde(default = "default_max_destinations")]
    pub max_destinations: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            source_channel: 0,
            destinations: Vec::new(),
            max_destinations: default_max_destinations(),
        }
    }
}

/// Webhook receiver configuration. When disabled the bot long-polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_webhook_host")]
    pub host: String,
    #[serde(default = "default_webhook_port")]
    pub port: u16,
    /// Public base URL registered with Telegram (`{public_url}/webhook`).
    #[serde(default)]
    pub public_url: String,
    /// Shared secret Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`.
    /// Empty = no check.
    #[serde(default)]
    pub secret_token: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_webhook_host(),
            port: default_webhook_port(),
            public_url: String::new(),
            secret_token: String::new(),
        }
    }
}

impl Config {
    /// Check that the config can drive a running bot.
    pub fn validate(&self) -> Result<(), SuitcastError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(SuitcastError::Config(
                "telegram.bot_token is empty (set it in config.toml or TELEGRAM_BOT_TOKEN)".into(),
            ));
        }
        if self.routing.source_channel == 0 {
            return Err(SuitcastError::Config(
                "routing.source_channel must be set".into(),
            ));
        }
        if self.routing.max_destinations == 0 {
            return Err(SuitcastError::Config(
                "routing.max_destinations must be at least 1".into(),
            ));
        }
        if self.routing.destinations.is_empty() {
            return Err(SuitcastError::Config(
                "routing.destinations must list at least one chat".into(),
            ));
        }
        if self.routing.destinations.len() > self.routing.max_destinations {
            return Err(SuitcastError::Config(format!(
                "routing.destinations has {} entries, max is {}",
                self.routing.destinations.len(),
                self.routing.max_destinations
            )));
        }
        if self.webhook.enabled && self.webhook.public_url.trim().is_empty() {
            return Err(SuitcastError::Config(
                "webhook.enabled requires webhook.public_url".into(),
            ));
        }
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Notice to log once tracing is up when `path` does not exist.
pub fn missing_notice(path: &str) -> Option<String> {
    (!Path::new(path).exists()).then(|| format!("Config file not found at {path}, using defaults"))
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. Runs before logging is
/// set up, so callers report the fallback themselves (see [`missing_notice`]).
pub fn load(path: &str) -> Result<Config, SuitcastError> {
    let path = Path::new(path);
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| SuitcastError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| SuitcastError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
