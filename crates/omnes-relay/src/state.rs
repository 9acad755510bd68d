//! Relay state shared across route handlers.
//!
//! The relay keeps no conversation state between calls; `RelayState` only
//! carries configuration and the provider client.

use std::sync::Arc;
use std::time::Instant;

use omnes_core::config::{ProviderConfig, RelayConfig};

use crate::provider::ChatProvider;

/// Shared relay state. All fields are cheap to clone.
#[derive(Clone)]
pub struct RelayState {
    /// HTTP server settings (CORS, limits).
    pub relay: Arc<RelayConfig>,
    /// Provider settings, including the optional credential.
    pub provider_config: Arc<ProviderConfig>,
    /// The provider client.
    pub provider: Arc<dyn ChatProvider>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl RelayState {
    pub fn new(
        relay: RelayConfig,
        provider_config: ProviderConfig,
        provider: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            relay: Arc::new(relay),
            provider_config: Arc::new(provider_config),
            provider,
            start_time: Instant::now(),
        }
    }
}
