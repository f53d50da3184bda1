//! # Configuration Module
//!
//! Process settings read from environment variables (optionally seeded from a
//! `.env` file by `main`). Only the Telegram token is required; a missing AI
//! credential disables the AI features instead of failing startup.

use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://bot_database.db";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

/// Log output format selected by `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings for the Gemini provider, present only when a credential exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,
    /// AI provider settings; `None` when `GOOGLE_API_KEY` is not set
    pub ai: Option<AiSettings>,
    /// Administrator Telegram id, if configured
    pub admin_telegram_id: Option<i64>,
    /// SQLite connection string
    pub database_url: String,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let telegram_token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let timeout_secs = match get("AI_HTTP_TIMEOUT_SECS") {
            // Must be positive
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "AI_HTTP_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        let ai = get("GOOGLE_API_KEY").map(|api_key| AiSettings {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_base: get("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_secs(timeout_secs),
        });

        // 0 is the conventional "not set" value
        let admin_telegram_id = match get("ADMIN_TELEGRAM_ID") {
            Some(raw) => {
                let id = raw.parse::<i64>().map_err(|_| ConfigError::Invalid {
                    key: "ADMIN_TELEGRAM_ID",
                    value: raw,
                })?;
                (id != 0).then_some(id)
            }
            None => None,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            telegram_token,
            ai,
            admin_telegram_id,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            log_format,
        })
    }
}
