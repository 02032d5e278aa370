//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod evolution;

use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Version history
        .route(
            "/api/sources/{source_id}/versions",
            get(evolution::list_versions).post(evolution::record_version),
        )
        .route(
            "/api/sources/{source_id}/versions/{version_id}",
            get(evolution::get_version),
        )
        .route(
            "/api/sources/{source_id}/versions/number/{version_number}",
            get(evolution::get_version_by_number),
        )
        .route("/api/sources/{source_id}/prune", post(evolution::prune_versions))

        // Comparison
        .route("/api/sources/{source_id}/diff", get(evolution::diff_versions))
        .route("/api/diff", post(evolution::compare_inline))

        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
