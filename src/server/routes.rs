//! Router configuration for the web server.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let max_upload = state.settings.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index).post(handlers::upload))
        .route("/static/style.css", get(handlers::serve_css))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
