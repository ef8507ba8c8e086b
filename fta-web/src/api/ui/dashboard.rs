//! Dashboard page rendering
//!
//! All user- and model-provided text passes through [`escape_html`].

use crate::api::buildinfo::BuildInfo;
use crate::services::llm_handler::{Insight, LlmStatus};
use crate::services::orchestrator::{AnalysisReport, InputError, PanelOutcome, QaPanel};

use super::chart::render_sentiment_svg;
use super::escape_html;

const LOCAL_FALLBACK_MESSAGE: &str =
    "Using local processing for text analysis. Some features may be limited.";

const DISCLAIMER: &str = "Disclaimer: This tool provides automated analysis and should not be \
used as the sole basis for financial decisions. Always consult with qualified financial \
advisors for professional guidance.";

/// Inline message box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    fn render(&self) -> String {
        let class = match self.kind {
            NoticeKind::Info => "notice notice-info",
            NoticeKind::Warning => "notice notice-warning",
            NoticeKind::Error => "notice notice-error",
        };
        format!(
            r#"<div class="{}" role="alert">{}</div>"#,
            class,
            escape_html(&self.message)
        )
    }
}

/// Landing page: banner, input form, optional notice
pub fn render_index(status: &LlmStatus, notice: Option<Notice>) -> String {
    let notice = notice.map(|n| n.render()).unwrap_or_default();
    let body = format!("{}{}", notice, input_form(""));
    page(status, &body)
}

/// Input form with a decode warning; processing stopped before analysis
pub fn render_input_error(status: &LlmStatus, error: &InputError) -> String {
    let body = format!("{}{}", Notice::warning(error.to_string()).render(), input_form(""));
    page(status, &body)
}

/// Full dashboard with the three result panels
pub fn render_report(report: &AnalysisReport) -> String {
    let body = format!(
        r#"{form}
<section class="results" data-analysis-id="{id}">
    <div class="tabs">
        <input type="radio" name="tab" id="tab-sentiment" checked>
        <label for="tab-sentiment">Sentiment Analysis</label>
        <input type="radio" name="tab" id="tab-summary">
        <label for="tab-summary">Summary &amp; Insights</label>
        <input type="radio" name="tab" id="tab-qa">
        <label for="tab-qa">Q&amp;A</label>
        <div class="tab-panel" id="panel-sentiment">{sentiment}</div>
        <div class="tab-panel" id="panel-summary">{summary}</div>
        <div class="tab-panel" id="panel-qa">{qa}</div>
    </div>
</section>"#,
        form = input_form(&report.cleaned_text),
        id = report.id,
        sentiment = sentiment_panel(report),
        summary = summary_panel(report),
        qa = qa_panel(report),
    );
    page(&report.llm_status, &body)
}

fn sentiment_panel(report: &AnalysisReport) -> String {
    let s = &report.sentiment;
    format!(
        r#"<h2>Sentiment Analysis</h2>
<div class="metrics">
    <div class="metric"><span class="metric-label">Overall Sentiment</span><span class="metric-value">{label}</span></div>
    <div class="metric"><span class="metric-label">Compound Score</span><span class="metric-value">{compound:.2}</span></div>
    <div class="metric"><span class="metric-label">Confidence</span><span class="metric-value">{confidence:.2}</span></div>
    <div class="metric"><span class="metric-label">Words</span><span class="metric-value">{words}</span></div>
</div>
<div class="chart">{chart}</div>"#,
        label = s.sentiment,
        compound = s.compound,
        confidence = s.confidence(),
        words = report.word_count,
        chart = render_sentiment_svg(&report.chart),
    )
}

fn summary_panel(report: &AnalysisReport) -> String {
    let summary = match &report.summary {
        None => String::new(),
        Some(PanelOutcome::Ok { value }) => format!(
            "<h3>Summary</h3>\n<p class=\"summary\">{}</p>",
            escape_html(value)
        ),
        Some(PanelOutcome::Error { error }) => {
            format!("<h3>Summary</h3>\n{}", Notice::error(error.clone()).render())
        }
    };

    let insights = match &report.insights {
        None => String::new(),
        Some(PanelOutcome::Ok { value }) => {
            format!("<h3>Key Insights</h3>\n{}", insight_list(value))
        }
        Some(PanelOutcome::Error { error }) => {
            format!("<h3>Key Insights</h3>\n{}", Notice::error(error.clone()).render())
        }
    };

    format!("<h2>Summary &amp; Key Insights</h2>\n{}\n{}", summary, insights)
}

fn insight_list(insights: &[Insight]) -> String {
    if insights.is_empty() {
        return "<p class=\"muted\">No insights were identified in this text.</p>".to_string();
    }
    insights
        .iter()
        .map(|insight| {
            format!(
                "<details class=\"insight\"><summary>{}</summary><p>{}</p></details>",
                escape_html(&insight.topic),
                escape_html(&insight.detail)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn qa_panel(report: &AnalysisReport) -> String {
    let content = match &report.qa {
        QaPanel::Unavailable { message } => return format!(
            "<h2>Ask Questions</h2>\n{}",
            Notice::error(message.clone()).render()
        ),
        QaPanel::NotAsked => String::new(),
        QaPanel::Answered { question, answer } => {
            let answer = match answer {
                PanelOutcome::Ok { value } => {
                    format!("<p class=\"answer\">{}</p>", escape_html(value))
                }
                PanelOutcome::Error { error } => Notice::error(error.clone()).render(),
            };
            format!(
                "<h3>Answer</h3>\n<p class=\"muted\">Q: {}</p>\n{}",
                escape_html(question),
                answer
            )
        }
    };

    format!(
        r#"<h2>Ask Questions</h2>
<form class="qa-form" method="post" action="/analyze" enctype="multipart/form-data">
    <input type="hidden" name="input_method" value="paste">
    <input type="hidden" name="text" value="{text}">
    <label for="question">Ask a question about the text:</label>
    <input type="text" id="question" name="question" placeholder="E.g., What are the main risks discussed?">
    <button type="submit" class="button">Ask</button>
</form>
{content}"#,
        text = escape_html(&report.cleaned_text),
        content = content,
    )
}

fn input_form(text: &str) -> String {
    format!(
        r#"<section class="input">
<h2>Input Text</h2>
<form id="analyze-form" method="post" action="/analyze" enctype="multipart/form-data">
    <div class="input-method">
        <span>Choose input method:</span>
        <label><input type="radio" name="input_method" value="paste" checked> Paste Text</label>
        <label><input type="radio" name="input_method" value="upload"> Upload File</label>
    </div>
    <div id="paste-input">
        <label for="text">Enter your financial text here:</label>
        <textarea id="text" name="text" rows="10" placeholder="Paste your financial text here...">{text}</textarea>
    </div>
    <div id="upload-input" hidden>
        <label for="file">Upload a text file</label>
        <input type="file" id="file" name="file" accept=".txt,text/plain">
    </div>
    <button type="submit" class="button">Analyze</button>
    <span id="processing" class="muted" hidden>Processing text...</span>
</form>
</section>"#,
        text = escape_html(text),
    )
}

fn status_banner(status: &LlmStatus) -> String {
    if status.available {
        return String::new();
    }
    let mut banner = Notice::warning(
        status
            .error
            .clone()
            .unwrap_or_else(|| "AI service unavailable".to_string()),
    )
    .render();
    if status.uses_local_fallback() {
        banner.push_str(&Notice::info(LOCAL_FALLBACK_MESSAGE).render());
    }
    banner
}

fn page(status: &LlmStatus, body: &str) -> String {
    let build = BuildInfo::current();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Financial Text Analyzer</title>
    <link rel="stylesheet" href="/static/fta-ui.css">
</head>
<body>
    <header>
        <div class="header-content">
            <div class="header-left">
                <h1>Financial Text Analyzer</h1>
                <div class="subtitle">Sentiment analysis, summaries and insights for financial text</div>
            </div>
            <div class="header-right">
                <div class="build-info-line">v{version} [{git_hash}]</div>
                <div class="build-info-line">{build_timestamp} ({build_profile})</div>
            </div>
        </div>
    </header>
    <main class="container">
        {banner}
        {body}
    </main>
    <footer>
        <p>{disclaimer}</p>
    </footer>
    <script>
        (function () {{
            const form = document.getElementById('analyze-form');
            if (!form) return;
            const paste = document.getElementById('paste-input');
            const upload = document.getElementById('upload-input');
            form.querySelectorAll('input[name="input_method"]').forEach(function (radio) {{
                radio.addEventListener('change', function () {{
                    const useUpload = radio.value === 'upload' && radio.checked;
                    paste.hidden = useUpload;
                    upload.hidden = !useUpload;
                }});
            }});
            document.querySelectorAll('form').forEach(function (f) {{
                f.addEventListener('submit', function () {{
                    const indicator = document.getElementById('processing');
                    if (indicator) indicator.hidden = false;
                }});
            }});
        }})();
    </script>
</body>
</html>"#,
        version = build.version,
        git_hash = build.git_hash,
        build_timestamp = build.build_timestamp,
        build_profile = build.build_profile,
        banner = status_banner(status),
        body = body,
        disclaimer = DISCLAIMER,
    )
}
