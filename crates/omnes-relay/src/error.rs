//! Relay failure taxonomy and its uniform reply encoding.
//!
//! Every failure is answered with HTTP 200 and a `{ "reply": "..." }` body so
//! the widget only ever decodes one shape. Provider details never reach the
//! client; only the configuration failure names the missing setting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use omnes_core::config::ENV_API_KEY;
use omnes_core::RelayReply;

/// Reply sent when the provider answers with a non-success status.
pub const PROVIDER_FAILURE_REPLY: &str =
    "Lo siento, tuve un inconveniente técnico. ¿Podrías intentar de nuevo en un momento?";

/// Reply sent when the payload cannot be parsed or processing fails.
pub const CRITICAL_FAILURE_REPLY: &str = "Error crítico en la función de chat.";

/// Reply sent when the relay is over its request rate.
pub const RATE_LIMITED_REPLY: &str =
    "Estoy recibiendo demasiadas consultas en este momento. ¿Podrías intentar de nuevo en unos segundos?";

/// A handled relay failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFailure {
    /// The provider credential is not configured.
    Configuration,
    /// The provider returned a non-success status.
    Provider,
    /// Unparseable input, transport failure, or malformed provider output.
    Critical,
    /// The per-second request budget is exhausted.
    RateLimited,
}

impl RelayFailure {
    /// The user-facing reply text for this failure.
    pub fn reply_text(&self) -> String {
        match self {
            RelayFailure::Configuration => format!(
                "Configuración incompleta: Por favor, define la variable {} en la configuración del relay.",
                ENV_API_KEY
            ),
            RelayFailure::Provider => PROVIDER_FAILURE_REPLY.to_string(),
            RelayFailure::Critical => CRITICAL_FAILURE_REPLY.to_string(),
            RelayFailure::RateLimited => RATE_LIMITED_REPLY.to_string(),
        }
    }
}

impl IntoResponse for RelayFailure {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(RelayReply::new(self.reply_text()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_reply_names_setting() {
        let text = RelayFailure::Configuration.reply_text();
        assert!(text.starts_with("Configuración incompleta"));
        assert!(text.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_fixed_replies() {
        assert_eq!(RelayFailure::Provider.reply_text(), PROVIDER_FAILURE_REPLY);
        assert_eq!(RelayFailure::Critical.reply_text(), CRITICAL_FAILURE_REPLY);
        assert_eq!(RelayFailure::RateLimited.reply_text(), RATE_LIMITED_REPLY);
    }

    #[test]
    fn test_failures_respond_with_ok_status() {
        for failure in [
            RelayFailure::Configuration,
            RelayFailure::Provider,
            RelayFailure::Critical,
            RelayFailure::RateLimited,
        ] {
            let resp = failure.into_response();
            assert_eq!(resp.status(), StatusCode::OK);
        }
    }
}
