//! Router construction: routes, CORS and body limit

use super::handlers;
use super::state::AppState;
use axum::Router;
use axum::http::{HeaderValue, Method, header, request::Parts};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// HTTP-level settings of the API
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

pub fn build_router(state: AppState, settings: &ServerSettings) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/heartbeat", get(handlers::heartbeat))
        .route("/stage1", post(handlers::stage1))
        .route("/stage2", post(handlers::stage2))
        .route("/stage3", post(handlers::stage3))
        .route("/runs", get(handlers::list_runs))
        .route(
            "/runs/{id}",
            get(handlers::get_run).delete(handlers::delete_run),
        )
        .route("/request/{id}", get(handlers::get_request))
        .with_state(state)
        .layer(cors_layer(&settings.cors_origins))
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Arc<[String]> = origins.into();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|o| origins.iter().any(|allowed| allowed == o) || is_local_origin(o))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// `http://localhost:<port>`
fn is_local_origin(origin: &str) -> bool {
    origin
        .strip_prefix("http://localhost:")
        .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}
