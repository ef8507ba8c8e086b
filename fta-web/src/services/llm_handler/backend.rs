//! Text-generation backends
//!
//! [`GenerationBackend`] is the seam between [`super::LlmHandler`] and the
//! external service. [`OpenAiBackend`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint.

use async_trait::async_trait;
use fta_common::config::{LlmConfig, ResolvedApiKey};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::GenerationError;

const USER_AGENT: &str = concat!("fta-web/", env!("CARGO_PKG_VERSION"));

/// Longest error body excerpt kept in [`GenerationError::Api`]
const ERROR_BODY_LIMIT: usize = 300;

/// Which handler operation issued a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Summary,
    Insights,
    Answer,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Summary => "summary",
            Operation::Insights => "insights",
            Operation::Answer => "answer",
        }
    }
}

/// One chat-style request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub operation: Operation,
    pub system: String,
    pub user: String,
    /// Ask the service for a JSON object reply
    pub json_output: bool,
}

/// External text-generation service
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Check credentials and reachability
    async fn probe(&self) -> Result<(), GenerationError>;

    /// Run one completion and return the reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI-compatible chat completion client
pub struct OpenAiBackend {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiBackend {
    /// Create a client from configuration
    ///
    /// A missing key is not an error here: the probe reports it, so the
    /// service can still start with the local fallback.
    pub fn new(config: &LlmConfig, api_key: Option<ResolvedApiKey>) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10).min(config.timeout()))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.map(|k| k.key),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key.as_deref().ok_or_else(|| {
            GenerationError::Unavailable(
                "AI service API key not configured. Set FTA_LLM_API_KEY or OPENAI_API_KEY, \
                 or add api_key to the [llm] section of the config file"
                    .to_string(),
            )
        })
    }

    /// Map a non-success HTTP status to a generation error
    async fn status_error(response: reqwest::Response) -> GenerationError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        map_status(status, &body)
    }
}

/// Error for a non-success status, preferring the service's own message
fn map_status(status: u16, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| excerpt(body, ERROR_BODY_LIMIT));

    match status {
        401 | 403 => GenerationError::Authentication,
        429 => GenerationError::RateLimited(message),
        code => GenerationError::Api { status: code, body: message },
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    async fn probe(&self) -> Result<(), GenerationError> {
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(transport_error)?;

        tracing::debug!(status_code = response.status().as_u16(), "AI service probe response");

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::status_error(response).await)
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key()?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format: request
                .json_output
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let started = Instant::now();
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        tracing::debug!(
            operation = request.operation.as_str(),
            status_code = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "AI service completion response"
        );

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

fn transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Transport(format!("request timed out: {}", e))
    } else {
        GenerationError::Transport(e.to_string())
    }
}

/// First `limit` characters of `text`, on a char boundary
fn excerpt(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
