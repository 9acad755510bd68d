//! Route handler functions.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use omnes_core::{RelayReply, RelayRequest};

use crate::compose::compose_request;
use crate::error::RelayFailure;
use crate::provider::ProviderError;
use crate::state::RelayState;

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub provider_configured: bool,
    pub model: String,
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /api/chat - relay one widget message to the provider.
///
/// The body is read as raw bytes so that a malformed payload is answered with
/// the critical-failure reply instead of an extractor rejection status.
pub async fn chat(
    State(state): State<RelayState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RelayReply>, RelayFailure> {
    let body = body.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read chat request body");
        RelayFailure::Critical
    })?;

    let request: RelayRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected unparseable chat request");
        RelayFailure::Critical
    })?;

    let Some(credential) = state.provider_config.credential() else {
        tracing::error!("Provider credential is not configured; refusing chat request");
        return Err(RelayFailure::Configuration);
    };

    let completion = compose_request(
        &request,
        &state.provider_config.model,
        state.provider_config.temperature,
    );

    tracing::debug!(
        model = %completion.model,
        history_len = request.history.len(),
        "Forwarding chat to provider"
    );

    match state.provider.complete(credential, &completion).await {
        Ok(reply) => Ok(Json(RelayReply::new(reply))),
        Err(ProviderError::Status { status, body }) => {
            tracing::error!(status, body = %body, "Provider returned an error response");
            Err(RelayFailure::Provider)
        }
        Err(e) => {
            tracing::error!(error = %e, "Provider call failed");
            Err(RelayFailure::Critical)
        }
    }
}

/// GET /health - health check.
pub async fn health(State(state): State<RelayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        provider_configured: state.provider_config.credential().is_some(),
        model: state.provider_config.model.clone(),
    })
}
