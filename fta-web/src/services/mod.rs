//! Analysis services
//!
//! Leaf to root: text preprocessing, sentiment scoring, AI generation (with
//! the offline summarizer as its fallback), and the per-request orchestrator.

pub mod llm_handler;
pub mod local_summarizer;
pub mod orchestrator;
pub mod sentiment_analyzer;
pub mod text_processor;

pub use orchestrator::{AnalysisContext, AnalysisReport, AnalysisRequest, InputError, InputSource};
