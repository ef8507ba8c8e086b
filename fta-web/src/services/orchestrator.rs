//! Per-request analysis pipeline
//!
//! **Stages:** `Idle → TextReceived → Cleaned → SentimentComputed →
//! {SummaryRequested, InsightsRequested, AnswerRequested} → Rendered`
//!
//! Each stage is a distinct type, so a later stage can only be reached by
//! consuming the one before it. The three AI branches borrow the scored
//! stage independently and may be skipped. Q&A additionally requires a
//! [`QaAccess`] token, which only exists when the AI service is available.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::services::llm_handler::{GenerationResult, Insight, LlmHandler, LlmStatus};
use crate::services::sentiment_analyzer::{
    create_sentiment_chart, ChartSpec, SentimentAnalyzer, SentimentResult,
};
use crate::services::text_processor::{ProcessedText, TextPreprocessor};

/// Shown in the Q&A panel when the AI service is unavailable
pub const QA_UNAVAILABLE_MESSAGE: &str =
    "Q&A feature is currently unavailable. This feature requires API access.";

/// Components shared by every request
///
/// Constructed once at startup and passed to the HTTP layer.
pub struct AnalysisContext {
    preprocessor: TextPreprocessor,
    sentiment: SentimentAnalyzer,
    llm: LlmHandler,
}

impl AnalysisContext {
    pub fn new(preprocessor: TextPreprocessor, sentiment: SentimentAnalyzer, llm: LlmHandler) -> Self {
        Self {
            preprocessor,
            sentiment,
            llm,
        }
    }

    pub fn preprocessor(&self) -> &TextPreprocessor {
        &self.preprocessor
    }

    pub fn sentiment(&self) -> &SentimentAnalyzer {
        &self.sentiment
    }

    pub fn llm(&self) -> &LlmHandler {
        &self.llm
    }

    pub fn llm_status(&self) -> &LlmStatus {
        self.llm.get_status()
    }

    /// Q&A precondition; `None` while the AI service is unavailable
    pub fn qa_access(&self) -> Option<QaAccess> {
        self.llm_status().available.then_some(QaAccess { _private: () })
    }

    /// Answer a question; callers must first hold a [`QaAccess`]
    pub async fn answer(&self, _access: &QaAccess, text: &str, question: &str) -> GenerationResult<String> {
        let cleaned = self.preprocessor.clean_text(text);
        self.llm.answer_question(&cleaned, question).await
    }

    /// Run the full pipeline for one request
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, InputError> {
        let mut trail = vec![Stage::Idle];
        let id = Uuid::new_v4();

        let received = Received::accept(request.input, &mut trail)?;
        let cleaned = received.clean(&self.preprocessor, &mut trail);
        let scored = cleaned.score(&self.sentiment, &mut trail);

        info!(
            analysis_id = %id,
            chars = scored.cleaned_text.chars().count(),
            tokens = scored.processed.token_count(),
            sentiment = %scored.sentiment.sentiment,
            compound = scored.sentiment.compound,
            "Text received and scored"
        );

        let summary: Option<PanelOutcome<String>> = if request.summary {
            Some(scored.summary(&self.llm, &mut trail).await.into())
        } else {
            None
        };

        let insights: Option<PanelOutcome<Vec<Insight>>> = if request.insights {
            Some(scored.insights(&self.llm, &mut trail).await.into())
        } else {
            None
        };

        let qa = match self.qa_access() {
            None => QaPanel::Unavailable {
                message: QA_UNAVAILABLE_MESSAGE.to_string(),
            },
            Some(access) => match request.question.as_deref().map(str::trim) {
                Some(question) if !question.is_empty() => QaPanel::Answered {
                    question: question.to_string(),
                    answer: scored.answer(&access, &self.llm, question, &mut trail).await.into(),
                },
                _ => QaPanel::NotAsked,
            },
        };

        trail.push(Stage::Rendered);
        debug!(analysis_id = %id, stages = ?trail, "Analysis complete");

        Ok(AnalysisReport {
            id,
            stages: trail,
            word_count: scored.processed.token_count(),
            cleaned_text: scored.cleaned_text,
            sentiment: scored.sentiment,
            chart: scored.chart,
            summary,
            insights,
            qa,
            llm_status: self.llm_status().clone(),
        })
    }
}

/// Proof that the AI service was available when Q&A was requested
#[derive(Debug)]
pub struct QaAccess {
    _private: (),
}

/// Pipeline stages, recorded in visiting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    TextReceived,
    Cleaned,
    SentimentComputed,
    SummaryRequested,
    InsightsRequested,
    AnswerRequested,
    Rendered,
}

/// How the text reached the service
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Typed or pasted into the text area
    Pasted(String),
    /// Uploaded `.txt` file, decoded as UTF-8
    Uploaded {
        filename: Option<String>,
        bytes: Vec<u8>,
    },
}

impl InputSource {
    /// Decode into raw text
    ///
    /// Uploads that are not valid UTF-8 are rejected here, before any
    /// preprocessing.
    pub fn into_raw(self) -> Result<RawInput, InputError> {
        let text = match self {
            InputSource::Pasted(text) => text,
            InputSource::Uploaded { filename, bytes } => String::from_utf8(bytes).map_err(|e| {
                InputError::Decode {
                    filename: filename.unwrap_or_else(|| "upload".to_string()),
                    reason: e.utf8_error().to_string(),
                }
            })?,
        };

        if text.trim().is_empty() {
            return Err(InputError::Empty);
        }
        Ok(RawInput(text))
    }
}

/// Text as received, before cleaning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput(String);

impl RawInput {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Input acquisition failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Could not read '{filename}' as UTF-8 text: {reason}")]
    Decode { filename: String, reason: String },

    #[error("No text provided. Paste some text or upload a .txt file.")]
    Empty,
}

/// One analysis request
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub input: InputSource,
    pub summary: bool,
    pub insights: bool,
    pub question: Option<String>,
}

impl AnalysisRequest {
    /// Pasted text with summary and insights enabled
    pub fn pasted(text: impl Into<String>) -> Self {
        Self {
            input: InputSource::Pasted(text.into()),
            summary: true,
            insights: true,
            question: None,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }
}

/// Panel content: a value or an inline error message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelOutcome<T> {
    Ok { value: T },
    Error { error: String },
}

impl<T> PanelOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, PanelOutcome::Ok { .. })
    }
}

impl<T> From<GenerationResult<T>> for PanelOutcome<T> {
    fn from(result: GenerationResult<T>) -> Self {
        match result {
            Ok(value) => PanelOutcome::Ok { value },
            Err(e) => PanelOutcome::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Q&A panel state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QaPanel {
    /// Service available, no question asked
    NotAsked,
    /// Service unavailable; the question box is replaced by this message
    Unavailable { message: String },
    Answered {
        question: String,
        answer: PanelOutcome<String>,
    },
}

/// Everything the dashboard renders for one request
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub stages: Vec<Stage>,
    pub cleaned_text: String,
    pub word_count: usize,
    pub sentiment: SentimentResult,
    pub chart: ChartSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PanelOutcome<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<PanelOutcome<Vec<Insight>>>,
    pub qa: QaPanel,
    pub llm_status: LlmStatus,
}

struct Received {
    raw: RawInput,
}

struct Cleaned {
    cleaned_text: String,
    processed: ProcessedText,
}

struct Scored {
    cleaned_text: String,
    processed: ProcessedText,
    sentiment: SentimentResult,
    chart: ChartSpec,
}

impl Received {
    fn accept(input: InputSource, trail: &mut Vec<Stage>) -> Result<Self, InputError> {
        let raw = input.into_raw()?;
        trail.push(Stage::TextReceived);
        Ok(Self { raw })
    }

    fn clean(self, preprocessor: &TextPreprocessor, trail: &mut Vec<Stage>) -> Cleaned {
        let cleaned_text = preprocessor.clean_text(self.raw.as_str());
        let processed = preprocessor.preprocess_text(self.raw.as_str(), false);
        trail.push(Stage::Cleaned);
        Cleaned {
            cleaned_text,
            processed,
        }
    }
}

impl Cleaned {
    fn score(self, analyzer: &SentimentAnalyzer, trail: &mut Vec<Stage>) -> Scored {
        let sentiment = analyzer.analyze_sentiment(&self.cleaned_text);
        let chart = create_sentiment_chart(&sentiment);
        trail.push(Stage::SentimentComputed);
        Scored {
            cleaned_text: self.cleaned_text,
            processed: self.processed,
            sentiment,
            chart,
        }
    }
}

impl Scored {
    async fn summary(&self, llm: &LlmHandler, trail: &mut Vec<Stage>) -> GenerationResult<String> {
        trail.push(Stage::SummaryRequested);
        llm.generate_summary(&self.cleaned_text).await
    }

    async fn insights(&self, llm: &LlmHandler, trail: &mut Vec<Stage>) -> GenerationResult<Vec<Insight>> {
        trail.push(Stage::InsightsRequested);
        llm.extract_key_insights(&self.cleaned_text)
            .await
            .map(|key_insights| key_insights.insights)
    }

    async fn answer(
        &self,
        _access: &QaAccess,
        llm: &LlmHandler,
        question: &str,
        trail: &mut Vec<Stage>,
    ) -> GenerationResult<String> {
        trail.push(Stage::AnswerRequested);
        llm.answer_question(&self.cleaned_text, question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pasted_input() {
        let raw = InputSource::Pasted("Revenue rose.".to_string()).into_raw().unwrap();
        assert_eq!(raw.as_str(), "Revenue rose.");
    }

    #[test]
    fn test_uploaded_utf8_input() {
        let raw = InputSource::Uploaded {
            filename: Some("q3.txt".to_string()),
            bytes: "Bénéfice net en hausse".as_bytes().to_vec(),
        }
        .into_raw()
        .unwrap();
        assert_eq!(raw.as_str(), "Bénéfice net en hausse");
    }

    #[test]
    fn test_uploaded_binary_is_decode_error() {
        let err = InputSource::Uploaded {
            filename: Some("chart.png".to_string()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47, 0xff, 0xfe, 0x00],
        }
        .into_raw()
        .unwrap_err();
        match err {
            InputError::Decode { filename, reason } => {
                assert_eq!(filename, "chart.png");
                assert!(!reason.is_empty());
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_input_is_empty_error() {
        assert_eq!(
            InputSource::Pasted("  \n ".to_string()).into_raw().unwrap_err(),
            InputError::Empty
        );
    }

    #[test]
    fn test_panel_outcome_serialization() {
        let ok: PanelOutcome<String> = Ok("fine".to_string()).into();
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"status": "ok", "value": "fine"})
        );

        let err: PanelOutcome<String> =
            Err(crate::services::llm_handler::GenerationError::EmptyResponse).into();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"status": "error", "error": "AI service returned an empty response"})
        );
    }

    #[test]
    fn test_success_value_with_error_key_is_not_an_error() {
        // A successful payload that happens to mention "error" stays a success
        let ok: PanelOutcome<serde_json::Value> = Ok(serde_json::json!({"error": "none"})).into();
        assert!(ok.is_ok());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
