//! # Error Types Module
//!
//! This module defines the error types shared by the storefront bot:
//! configuration, catalog storage, the AI gateway and user input validation.

use thiserror::Error;

/// Errors raised while loading process configuration. Always fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting is absent or empty
    #[error("missing required setting {0}")]
    Missing(&'static str),
    /// A setting is present but cannot be parsed
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Errors raised by the catalog store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be reached or the query failed
    #[error("catalog store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Errors raised by the AI gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    /// No provider credential was configured; permanent for the process lifetime
    #[error("AI provider is not configured")]
    Unconfigured,
    /// The upstream call failed; the next question may succeed
    #[error("AI request failed: {0}")]
    RequestFailed(String),
}

/// Rejections for user input where a text question is expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    /// The message carried no text at all (photo, sticker, ...)
    #[error("message has no text")]
    NotText,
    /// The text was empty after trimming
    #[error("message text is empty")]
    Empty,
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter
        let err = err.without_url();
        if err.is_timeout() {
            AiError::RequestFailed(format!("timed out: {err}"))
        } else {
            AiError::RequestFailed(err.to_string())
        }
    }
}
