//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{clear_potholes, health, list_potholes, receive_pothole, root};
use crate::state::AppState;

/// Create the collector router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/pothole", post(receive_pothole))
        .route("/potholes", get(list_potholes))
        .route("/potholes", delete(clear_potholes));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(api_routes)
        .merge(metrics_routes)
        // Persisted images served under the path recorded in each record
        .nest_service("/images", ServeDir::new(state.store.images_dir().to_path_buf()))
        // Body limit sized for JPEG uploads (axum's default is too small)
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Permissive CORS so the dashboard can call the collector from anywhere.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
