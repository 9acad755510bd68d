//! Omnes relay crate - stateless axum gateway between the chat widget and the
//! language-model provider.
//!
//! Validates the widget payload, prepends the fixed system instruction,
//! forwards the conversation to the provider, and normalizes every outcome
//! into a `{ "reply": "..." }` body with HTTP 200.

pub mod compose;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::RelayFailure;
pub use provider::{ChatProvider, CompletionRequest, OpenAiProvider, ProviderError};
pub use routes::{create_router, start_server};
pub use state::RelayState;
