//! # AI Gateway
//!
//! A single stateless text-completion call. Whether the AI is usable at all
//! is decided once at startup and carried as an [`AiCapability`] value, so
//! "not configured" is never confused with "this request failed".

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::AiSettings;
use crate::errors::AiError;

/// Longest slice of an error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 300;

/// A text-in, text-out completion backend
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Generate an answer for `prompt`. One attempt, no retries.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// AI availability, injected into the dialog controller at construction
#[derive(Clone)]
pub enum AiCapability {
    Available(Arc<dyn CompletionProvider>),
    Unconfigured,
}

impl AiCapability {
    /// Build the capability from settings. No settings means no AI.
    pub fn from_settings(settings: Option<&AiSettings>) -> Self {
        match settings {
            Some(settings) => match GeminiProvider::new(settings) {
                Ok(provider) => {
                    info!(model = %settings.model, "Gemini AI provider configured");
                    Self::Available(Arc::new(provider))
                }
                Err(e) => {
                    error!(error = %e, "Failed to build Gemini HTTP client, AI features are disabled");
                    Self::Unconfigured
                }
            },
            None => {
                warn!("GOOGLE_API_KEY is not set, AI features are disabled");
                Self::Unconfigured
            }
        }
    }

    pub fn available<P: CompletionProvider + 'static>(provider: P) -> Self {
        Self::Available(Arc::new(provider))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Ask the configured provider a question
    pub async fn ask(&self, question: &str) -> Result<String, AiError> {
        let provider = match self {
            Self::Available(provider) => provider,
            Self::Unconfigured => return Err(AiError::Unconfigured),
        };

        info!(provider = provider.name(), question_len = question.len(), "Sending question to AI provider");

        match provider.generate(question).await {
            Ok(answer) => {
                info!(provider = provider.name(), answer_len = answer.len(), "AI provider answered");
                Ok(answer)
            }
            Err(e) => {
                error!(provider = provider.name(), error = %e, "AI request failed");
                Err(e)
            }
        }
    }
}

impl fmt::Debug for AiCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(provider) => write!(f, "Available({})", provider.name()),
            Self::Unconfigured => write!(f, "Unconfigured"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Google Gemini `generateContent` provider
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiProvider {
    pub fn new(settings: &AiSettings) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            http_client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base: settings.api_base.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        // The key only travels in the query string; AiError drops the URL
        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let excerpt: String = error_text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(AiError::RequestFailed(format!("HTTP {status}: {excerpt}")));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        extract_answer(parsed)
    }
}

/// Join the text parts of the first candidate
fn extract_answer(response: GenerateContentResponse) -> Result<String, AiError> {
    let answer: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if answer.trim().is_empty() {
        return Err(AiError::RequestFailed("response contained no text".to_string()));
    }

    Ok(answer)
}
