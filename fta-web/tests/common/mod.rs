//! Shared test helpers: scripted generation backend and app builders

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use fta_web::services::llm_handler::{
    CompletionRequest, GenerationBackend, GenerationError, HandlerOptions, LlmHandler, LlmStatus,
    Operation,
};
use fta_web::services::sentiment_analyzer::SentimentAnalyzer;
use fta_web::services::text_processor::TextPreprocessor;
use fta_web::services::AnalysisContext;
use fta_web::{build_router, AppState};

pub const REPORT: &str = "Revenue grew 12% to $4.2 billion in the third quarter. \
    Operating margin improved thanks to strong cloud demand. \
    Management raised full-year guidance. \
    However, rising interest rates remain a risk to growth.";

type Responder = dyn Fn(&CompletionRequest) -> Result<String, GenerationError> + Send + Sync;

/// Backend double with scripted replies and call counters
pub struct ScriptedBackend {
    probe: Result<(), GenerationError>,
    respond: Box<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    probes: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            probe: Ok(()),
            respond: Box::new(respond),
            delay: None,
            calls: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
        }
    }

    /// Replies per operation with fixed text
    pub fn healthy() -> Self {
        Self::new(|request| {
            Ok(match request.operation {
                Operation::Summary => "Revenue and margins improved; rates are a risk.".to_string(),
                Operation::Insights => r#"{"insights": [
                    {"topic": "Revenue", "detail": "Grew 12% to $4.2 billion."},
                    {"topic": "Margins", "detail": "Improved on cloud demand."},
                    {"topic": "Risk", "detail": "Rising interest rates."}
                ]}"#
                .to_string(),
                Operation::Answer => "The main risk is rising interest rates.".to_string(),
            })
        })
    }

    pub fn failing(error: GenerationError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn with_probe(mut self, probe: Result<(), GenerationError>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn probe(&self) -> Result<(), GenerationError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.probe.clone()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(request)
    }
}

pub fn options(local_fallback: bool) -> HandlerOptions {
    HandlerOptions {
        timeout: Duration::from_secs(5),
        local_fallback,
    }
}

pub fn handler(backend: Arc<ScriptedBackend>, status: LlmStatus, local_fallback: bool) -> LlmHandler {
    LlmHandler::with_status(backend, status, options(local_fallback))
}

pub fn context(backend: Arc<ScriptedBackend>, status: LlmStatus, local_fallback: bool) -> AnalysisContext {
    AnalysisContext::new(
        TextPreprocessor::new(),
        SentimentAnalyzer::new(),
        handler(backend, status, local_fallback),
    )
}

pub fn app(backend: Arc<ScriptedBackend>, status: LlmStatus, local_fallback: bool) -> axum::Router {
    build_router(AppState::new(context(backend, status, local_fallback)))
}

pub const BOUNDARY: &str = "fta-test-boundary";

/// One multipart form part
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: text/plain\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    use http_body_util::BodyExt;
    body.collect()
        .await
        .expect("Should read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

pub async fn body_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Should be UTF-8")
}
