//! JSON analysis API
//!
//! Same pipeline as the dashboard, for scripting and tests. Generation
//! failures are returned as `{"status": "error", ..}` panels with HTTP 200;
//! only Q&A while the AI service is unavailable is a 503. Body rejections
//! use the [`ApiError`] envelope.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::buildinfo::get_build_info;
use crate::error::{ApiError, ApiResult};
use crate::services::llm_handler::{Insight, LlmStatus};
use crate::services::orchestrator::{
    AnalysisReport, AnalysisRequest, InputSource, PanelOutcome, QA_UNAVAILABLE_MESSAGE,
};
use crate::services::sentiment_analyzer::{ChartSpec, SentimentResult};
use crate::AppState;

/// Request body carrying only text
#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub text: String,
}

/// POST /api/analyze request
#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    pub text: String,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default = "default_true")]
    pub summary: bool,
    #[serde(default = "default_true")]
    pub insights: bool,
}

fn default_true() -> bool {
    true
}

/// POST /api/answer request
#[derive(Debug, Deserialize)]
pub struct AnswerBody {
    pub text: String,
    pub question: String,
}

/// POST /api/sentiment response
#[derive(Debug, Serialize)]
pub struct SentimentResponse {
    pub sentiment: SentimentResult,
    pub chart: ChartSpec,
}

/// Build JSON API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/buildinfo", get(get_build_info))
        .route("/api/analyze", post(analyze))
        .route("/api/sentiment", post(sentiment))
        .route("/api/summary", post(summary))
        .route("/api/insights", post(insights))
        .route("/api/answer", post(answer))
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<LlmStatus> {
    Json(state.ctx.llm_status().clone())
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeBody>, JsonRejection>,
) -> ApiResult<Json<AnalysisReport>> {
    let Json(body) = payload?;
    let request = AnalysisRequest {
        input: InputSource::Pasted(body.text),
        summary: body.summary,
        insights: body.insights,
        question: body.question,
    };
    let report = state.ctx.analyze(request).await?;
    info!(analysis_id = %report.id, "JSON analysis served");
    Ok(Json(report))
}

/// POST /api/sentiment
pub async fn sentiment(
    State(state): State<AppState>,
    payload: Result<Json<TextBody>, JsonRejection>,
) -> ApiResult<Json<SentimentResponse>> {
    let Json(body) = payload?;
    let cleaned = state.ctx.preprocessor().clean_text(&body.text);
    let analyzer = state.ctx.sentiment();
    let sentiment = analyzer.analyze_sentiment(&cleaned);
    let chart = analyzer.create_sentiment_chart(&sentiment);
    Ok(Json(SentimentResponse { sentiment, chart }))
}

/// POST /api/summary
pub async fn summary(
    State(state): State<AppState>,
    payload: Result<Json<TextBody>, JsonRejection>,
) -> ApiResult<Json<PanelOutcome<String>>> {
    let Json(body) = payload?;
    let cleaned = state.ctx.preprocessor().clean_text(&body.text);
    Ok(Json(state.ctx.llm().generate_summary(&cleaned).await.into()))
}

/// POST /api/insights
pub async fn insights(
    State(state): State<AppState>,
    payload: Result<Json<TextBody>, JsonRejection>,
) -> ApiResult<Json<PanelOutcome<Vec<Insight>>>> {
    let Json(body) = payload?;
    let cleaned = state.ctx.preprocessor().clean_text(&body.text);
    let result = state
        .ctx
        .llm()
        .extract_key_insights(&cleaned)
        .await
        .map(|key_insights| key_insights.insights);
    Ok(Json(result.into()))
}

/// POST /api/answer
///
/// 503 while the AI service is unavailable; Q&A has no local fallback.
pub async fn answer(
    State(state): State<AppState>,
    payload: Result<Json<AnswerBody>, JsonRejection>,
) -> ApiResult<Json<PanelOutcome<String>>> {
    let Json(body) = payload?;
    let access = state
        .ctx
        .qa_access()
        .ok_or_else(|| ApiError::ServiceUnavailable(QA_UNAVAILABLE_MESSAGE.to_string()))?;

    if body.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".to_string()));
    }

    let result = state.ctx.answer(&access, &body.text, &body.question).await;
    Ok(Json(result.into()))
}
