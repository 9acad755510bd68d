//! Client side of the widget-to-relay call.

use async_trait::async_trait;

use omnes_core::{RelayReply, RelayRequest};

use crate::error::WidgetError;

/// Transport for one relay exchange.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Send the message and context, returning the relay's reply.
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, WidgetError>;
}

/// `RelayClient` that POSTs JSON to the relay endpoint over HTTP.
pub struct HttpRelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, WidgetError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| WidgetError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, WidgetError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| WidgetError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::Status(status.as_u16()));
        }

        response
            .json::<RelayReply>()
            .await
            .map_err(|e| WidgetError::Decode(e.to_string()))
    }
}
