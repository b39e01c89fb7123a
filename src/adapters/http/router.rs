//! Top-level router: API routes plus the cross-cutting HTTP layers.

use std::time::Duration;

use axum::Router;
use http::{header, HeaderValue, Method};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::config::ServerConfig;

use super::health::health_router;

/// Assemble the full application router.
///
/// # Routes
/// - `GET /health`
/// - `GET /api/v1/ws?token=<jwt>`
pub fn app_router(server: &ServerConfig, ws_state: WebSocketState) -> Router {
    let hub = ws_state.hub.clone();

    Router::new()
        .nest("/api/v1", websocket_router(ws_state))
        .merge(health_router(hub))
        .layer(cors_layer(server))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(TraceLayer::new_for_http())
}

/// Any origin when none are configured, otherwise exactly the configured
/// frontends with credentials.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
        Method::PATCH,
    ];

    let origins: Vec<HeaderValue> = server
        .allowed_origins()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(methods)
        .max_age(Duration::from_secs(12 * 60 * 60));

    if origins.is_empty() {
        layer.allow_origin(Any).allow_headers(Any)
    } else {
        layer
            .allow_origin(origins)
            .allow_headers([
                header::ORIGIN,
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
            ])
            .allow_credentials(true)
    }
}
