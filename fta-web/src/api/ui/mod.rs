//! UI Routes - HTML pages for the fta-web dashboard
//!
//! Pages are rendered on the server; the only script is a small inline
//! toggle between the paste and upload inputs.

mod chart;
mod dashboard;
mod static_assets;

pub use chart::render_sentiment_svg;
pub use dashboard::{render_index, render_input_error, render_report, Notice, NoticeKind};
pub use static_assets::serve_fta_ui_css;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::services::orchestrator::{AnalysisRequest, InputError, InputSource};
use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_page))
        .route("/analyze", post(analyze_form))
        .route("/static/fta-ui.css", get(serve_fta_ui_css))
}

/// GET /
///
/// Dashboard landing page: status banner and input form
pub async fn root_page(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.ctx.llm_status(), None))
}

/// Fields of the dashboard form
#[derive(Debug, Default)]
struct FormFields {
    input_method: Option<String>,
    text: Option<String>,
    file_name: Option<String>,
    file_bytes: Option<Vec<u8>>,
    question: Option<String>,
}

impl FormFields {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = FormFields::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "input_method" => fields.input_method = Some(field.text().await.map_err(multipart_error)?),
                "text" => fields.text = Some(field.text().await.map_err(multipart_error)?),
                "question" => fields.question = Some(field.text().await.map_err(multipart_error)?),
                "file" => {
                    fields.file_name = field.file_name().map(str::to_string);
                    fields.file_bytes = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
                }
                _ => {}
            }
        }

        Ok(fields)
    }

    /// Pick the input the user chose
    ///
    /// Without an explicit `input_method`, a non-empty upload wins over the
    /// text area.
    fn into_input(self) -> InputSource {
        let has_upload = self.file_bytes.as_ref().is_some_and(|b| !b.is_empty());
        let use_upload = match self.input_method.as_deref() {
            Some("upload") => true,
            Some("paste") => false,
            _ => has_upload,
        };

        if use_upload {
            InputSource::Uploaded {
                filename: self.file_name.filter(|n| !n.is_empty()),
                bytes: self.file_bytes.unwrap_or_default(),
            }
        } else {
            InputSource::Pasted(self.text.unwrap_or_default())
        }
    }
}

/// POST /analyze
///
/// Runs the full pipeline. Summary and insights are always requested;
/// Q&A runs when a question was submitted.
pub async fn analyze_form(State(state): State<AppState>, multipart: Multipart) -> Response {
    let fields = match FormFields::read(multipart).await {
        Ok(fields) => fields,
        Err(e) => return e.into_response(),
    };

    let question = fields.question.clone().filter(|q| !q.trim().is_empty());
    let request = AnalysisRequest {
        input: fields.into_input(),
        summary: true,
        insights: true,
        question,
    };

    let status = state.ctx.llm_status();
    match state.ctx.analyze(request).await {
        Ok(report) => {
            info!(analysis_id = %report.id, "Dashboard analysis rendered");
            Html(render_report(&report)).into_response()
        }
        Err(e @ InputError::Decode { .. }) => {
            warn!(error = %e, "Rejected upload");
            (StatusCode::UNPROCESSABLE_ENTITY, Html(render_input_error(status, &e))).into_response()
        }
        Err(InputError::Empty) => {
            Html(render_index(status, Some(Notice::info(InputError::Empty.to_string())))).into_response()
        }
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_upload_wins_without_input_method() {
        let fields = FormFields {
            text: Some("typed".to_string()),
            file_name: Some("r.txt".to_string()),
            file_bytes: Some(b"uploaded".to_vec()),
            ..Default::default()
        };
        assert!(matches!(fields.into_input(), InputSource::Uploaded { .. }));
    }

    #[test]
    fn test_paste_method_ignores_upload() {
        let fields = FormFields {
            input_method: Some("paste".to_string()),
            text: Some("typed".to_string()),
            file_bytes: Some(b"uploaded".to_vec()),
            ..Default::default()
        };
        match fields.into_input() {
            InputSource::Pasted(text) => assert_eq!(text, "typed"),
            other => panic!("expected pasted input, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_field_falls_back_to_text() {
        let fields = FormFields {
            text: Some("typed".to_string()),
            file_name: Some(String::new()),
            file_bytes: Some(Vec::new()),
            ..Default::default()
        };
        assert!(matches!(fields.into_input(), InputSource::Pasted(_)));
    }
}
