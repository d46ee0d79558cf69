//! Route definitions for the LearnPath server.

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{get, post}
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer
};

use crate::handlers;
use crate::state::AppState;

/// Creates the Axum router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/generate_goals", post(handlers::generate_goals))
        .route("/generate_roadmap", post(handlers::generate_roadmap))
        .route("/generate_module_content", post(handlers::generate_module_content))
        .route("/generate_learning_cards", post(handlers::generate_learning_cards))
        .route("/generate_questions", post(handlers::generate_questions))
        .route("/generate_examples", post(handlers::generate_examples))
        .route("/explain_sentence", post(handlers::explain_sentence))
        .route("/generate_mini_module", post(handlers::generate_mini_module))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store")
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when none are configured; otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
