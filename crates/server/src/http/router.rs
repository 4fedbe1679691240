use super::handlers::{health, nuke, scan, triggers};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    if allowed_origins == "*" {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
        base.allow_origin(Any)
    } else {
        tracing::info!("CORS enabled for origins: {:?}", origins);
        base.allow_origin(origins)
    }
}

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/scan", post(scan::scan))
        .route("/api/nuke", post(nuke::nuke))
        .route("/api/triggers/mod-action", post(triggers::mod_action))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
