//! Static asset handlers for the dashboard
//!
//! Embeds and serves CSS at compile time

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const FTA_UI_CSS: &str = include_str!("../../../static/fta-ui.css");

/// GET /static/fta-ui.css
pub async fn serve_fta_ui_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        FTA_UI_CSS,
    )
        .into_response()
}
