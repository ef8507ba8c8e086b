//! fta-web - Financial Text Analyzer dashboard
//!
//! Serves the analysis dashboard and JSON API. Configuration is resolved as
//! CLI > environment > TOML file > compiled defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fta_common::config::{load_config, resolve_api_key, ConfigSource};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fta_web::api::buildinfo::BuildInfo;
use fta_web::services::llm_handler::{HandlerOptions, LlmHandler, OpenAiBackend};
use fta_web::services::sentiment_analyzer::SentimentAnalyzer;
use fta_web::services::text_processor::TextPreprocessor;
use fta_web::services::AnalysisContext;
use fta_web::AppState;

/// Command-line arguments for fta-web
#[derive(Parser, Debug)]
#[command(name = "fta-web")]
#[command(about = "Financial Text Analyzer dashboard")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "FTA_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides server.host)
    #[arg(long, env = "FTA_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long, env = "FTA_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let config = loaded.config;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let build = BuildInfo::current();
    info!(
        version = %build.version,
        git_hash = %build.git_hash,
        build_timestamp = %build.build_timestamp,
        build_profile = %build.build_profile,
        "Starting fta-web (Financial Text Analyzer)"
    );
    match &loaded.source {
        ConfigSource::Defaults => warn!("No config file found, using compiled defaults"),
        source => info!("Configuration: {}", source),
    }
    info!(
        base_url = %config.llm.base_url,
        model = %config.llm.model,
        timeout_secs = config.llm.timeout_secs,
        local_fallback = config.llm.local_fallback,
        "AI service settings"
    );

    let api_key = resolve_api_key(&config.llm);
    let backend = OpenAiBackend::new(&config.llm, api_key)
        .context("Failed to build AI service client")?;
    let llm = LlmHandler::initialize(Arc::new(backend), HandlerOptions::from_config(&config.llm)).await;

    let status = llm.get_status();
    if status.available {
        info!("AI features enabled");
    } else {
        warn!(
            error = status.error.as_deref().unwrap_or_default(),
            local_fallback = status.uses_local_fallback(),
            "AI features degraded"
        );
    }

    let ctx = AnalysisContext::new(TextPreprocessor::new(), SentimentAnalyzer::new(), llm);
    let state = AppState::new(ctx).with_max_upload_bytes(config.server.max_upload_bytes);
    let app = fta_web::build_router(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
