//! HTTP API handlers for fta-web

pub mod analyze;
pub mod buildinfo;
pub mod health;
pub mod ui;

pub use analyze::api_routes;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use ui::ui_routes;
