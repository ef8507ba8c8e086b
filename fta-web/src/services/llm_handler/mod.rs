//! AI text-generation handler
//!
//! Produces summaries, key insights and answers over a text by calling an
//! external service through a [`GenerationBackend`].
//!
//! # Contract
//! - Service status is probed once in [`LlmHandler::initialize`] and cached
//!   for the process lifetime.
//! - Every operation returns `Result<_, GenerationError>`; failures are
//!   values, single attempt, bounded by the configured timeout.
//! - When the service is unavailable, summary and insights fall back to the
//!   offline [`LocalSummarizer`] if enabled. Q&A has no fallback.

mod backend;
mod insights;
pub mod prompts;

pub use backend::{CompletionRequest, GenerationBackend, OpenAiBackend, Operation};
pub use insights::{parse_insights, Insight, KeyInsights};

use fta_common::config::LlmConfig;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::services::local_summarizer::LocalSummarizer;

/// Result of one generation operation
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Generation failures
///
/// Every variant renders a non-empty, user-presentable message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("AI service unavailable: {0}")]
    Unavailable(String),

    #[error("AI service did not respond within {:.1} seconds", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Network error contacting AI service: {0}")]
    Transport(String),

    #[error("AI service rejected the credentials; check the configured API key")]
    Authentication,

    #[error("AI service rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("AI service error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("AI service returned an empty response")]
    EmptyResponse,

    #[error("Could not parse AI service response: {0}")]
    Parse(String),

    #[error("No text provided")]
    EmptyInput,
}

/// Availability of the AI service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LlmStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_available: Option<bool>,
}

impl LlmStatus {
    pub fn available() -> Self {
        Self {
            available: true,
            error: None,
            local_available: None,
        }
    }

    pub fn unavailable(error: impl Into<String>, local_available: bool) -> Self {
        Self {
            available: false,
            error: Some(error.into()),
            local_available: Some(local_available),
        }
    }

    /// Whether summary/insights are served by the local fallback
    pub fn uses_local_fallback(&self) -> bool {
        !self.available && self.local_available.unwrap_or(false)
    }
}

/// Handler tuning
#[derive(Debug, Clone)]
pub struct HandlerOptions {
    pub timeout: Duration,
    pub local_fallback: bool,
}

impl HandlerOptions {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            timeout: config.timeout(),
            local_fallback: config.local_fallback,
        }
    }
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// AI text-generation handler
pub struct LlmHandler {
    backend: Arc<dyn GenerationBackend>,
    status: LlmStatus,
    timeout: Duration,
    local: Option<LocalSummarizer>,
}

impl LlmHandler {
    /// Probe the backend once and build the handler
    pub async fn initialize(backend: Arc<dyn GenerationBackend>, options: HandlerOptions) -> Self {
        info!(backend = backend.name(), "Checking AI service availability");

        let probe = match tokio::time::timeout(options.timeout, backend.probe()).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(options.timeout)),
        };

        let status = match probe {
            Ok(()) => {
                info!("AI service available");
                LlmStatus::available()
            }
            Err(e) => {
                warn!(error = %e, local_fallback = options.local_fallback, "AI service unavailable");
                LlmStatus::unavailable(e.to_string(), options.local_fallback)
            }
        };

        Self::with_status(backend, status, options)
    }

    /// Build the handler from an already known status (no probe)
    pub fn with_status(
        backend: Arc<dyn GenerationBackend>,
        status: LlmStatus,
        options: HandlerOptions,
    ) -> Self {
        let local = status.uses_local_fallback().then(LocalSummarizer::new);
        Self {
            backend,
            status,
            timeout: options.timeout,
            local,
        }
    }

    /// Cached service status
    pub fn get_status(&self) -> &LlmStatus {
        &self.status
    }

    /// Concise summary of `text`
    pub async fn generate_summary(&self, text: &str) -> GenerationResult<String> {
        ensure_text(text)?;

        if !self.status.available {
            let local = self.local.as_ref().ok_or_else(|| self.unavailable_error())?;
            debug!("Generating summary with local fallback");
            return local.summarize(text).ok_or_else(|| {
                GenerationError::Unavailable("local summarizer found no content words".to_string())
            });
        }

        let request = CompletionRequest {
            operation: Operation::Summary,
            system: prompts::SYSTEM_PROMPT.to_string(),
            user: prompts::summary_prompt(text),
            json_output: false,
        };
        let reply = self.call(&request, text.len()).await?;
        Ok(reply.trim().to_string())
    }

    /// Topic-tagged insights extracted from `text`
    pub async fn extract_key_insights(&self, text: &str) -> GenerationResult<KeyInsights> {
        ensure_text(text)?;

        if !self.status.available {
            let local = self.local.as_ref().ok_or_else(|| self.unavailable_error())?;
            debug!("Extracting insights with local fallback");
            return Ok(KeyInsights {
                insights: local.key_points(text),
            });
        }

        let request = CompletionRequest {
            operation: Operation::Insights,
            system: prompts::SYSTEM_PROMPT.to_string(),
            user: prompts::insights_prompt(text),
            json_output: true,
        };
        let reply = self.call(&request, text.len()).await?;
        let insights = parse_insights(&reply)?;
        debug!(count = insights.insights.len(), "Parsed insights");
        Ok(insights)
    }

    /// Answer `question` about `text`
    ///
    /// Returns [`GenerationError::Unavailable`] without contacting the
    /// backend when the service is unavailable.
    pub async fn answer_question(&self, text: &str, question: &str) -> GenerationResult<String> {
        if !self.status.available {
            return Err(self.unavailable_error());
        }
        ensure_text(text)?;
        if question.trim().is_empty() {
            return Err(GenerationError::EmptyInput);
        }

        let request = CompletionRequest {
            operation: Operation::Answer,
            system: prompts::SYSTEM_PROMPT.to_string(),
            user: prompts::question_prompt(text, question),
            json_output: false,
        };
        let reply = self.call(&request, text.len()).await?;
        Ok(reply.trim().to_string())
    }

    /// Single bounded backend call
    async fn call(&self, request: &CompletionRequest, input_len: usize) -> GenerationResult<String> {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.backend.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(reply) => info!(
                operation = request.operation.as_str(),
                input_len,
                reply_len = reply.len(),
                elapsed_ms,
                "Generation succeeded"
            ),
            Err(e) => warn!(
                operation = request.operation.as_str(),
                input_len,
                elapsed_ms,
                error = %e,
                "Generation failed"
            ),
        }

        let reply = result?;
        if reply.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(reply)
    }

    fn unavailable_error(&self) -> GenerationError {
        GenerationError::Unavailable(
            self.status
                .error
                .clone()
                .unwrap_or_else(|| "service not reachable".to_string()),
        )
    }
}

fn ensure_text(text: &str) -> GenerationResult<()> {
    if text.trim().is_empty() {
        Err(GenerationError::EmptyInput)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_non_empty() {
        let errors = [
            GenerationError::Unavailable(String::new()),
            GenerationError::Timeout(Duration::from_millis(1500)),
            GenerationError::Transport(String::new()),
            GenerationError::Authentication,
            GenerationError::RateLimited(String::new()),
            GenerationError::Api {
                status: 500,
                body: String::new(),
            },
            GenerationError::EmptyResponse,
            GenerationError::Parse(String::new()),
            GenerationError::EmptyInput,
        ];
        for e in errors {
            assert!(!e.to_string().trim().is_empty());
        }
    }

    #[test]
    fn test_timeout_message() {
        let e = GenerationError::Timeout(Duration::from_secs(30));
        assert_eq!(e.to_string(), "AI service did not respond within 30.0 seconds");
    }

    #[test]
    fn test_status_serialization() {
        let available = serde_json::to_value(LlmStatus::available()).unwrap();
        assert_eq!(available, serde_json::json!({"available": true}));

        let down = serde_json::to_value(LlmStatus::unavailable("no key", true)).unwrap();
        assert_eq!(
            down,
            serde_json::json!({"available": false, "error": "no key", "local_available": true})
        );
    }

    #[test]
    fn test_uses_local_fallback() {
        assert!(!LlmStatus::available().uses_local_fallback());
        assert!(LlmStatus::unavailable("x", true).uses_local_fallback());
        assert!(!LlmStatus::unavailable("x", false).uses_local_fallback());
    }
}
