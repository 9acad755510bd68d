//! Router setup with the relay routes and middleware.

use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use omnes_core::error::OmnesError;

use crate::handlers;
use crate::rate_limit::RateLimiter;
use crate::state::RelayState;

/// Path of the chat endpoint the widget posts to.
pub const CHAT_PATH: &str = "/api/chat";

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: RelayState) -> Router {
    let limiter = RateLimiter::new(state.relay.rate_limit_per_sec);

    let chat_routes = Router::new()
        .route(CHAT_PATH, post(handlers::chat))
        .layer(axum::middleware::from_fn(
            crate::rate_limit::rate_limit_middleware,
        ))
        .layer(axum::Extension(limiter));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(chat_routes)
        .layer(DefaultBodyLimit::max(state.relay.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.relay.allowed_origins))
        .with_state(state)
}

/// Bind the configured address and serve the relay until the process exits.
pub async fn start_server(state: RelayState) -> Result<(), OmnesError> {
    let addr = format!("{}:{}", state.relay.host, state.relay.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| OmnesError::Relay(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "Relay listening on http://{}{}", addr, CHAT_PATH);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| OmnesError::Relay(format!("Server error: {}", e)))?;

    Ok(())
}
