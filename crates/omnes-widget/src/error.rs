//! Error types for the assistant widget.

use std::time::Duration;

use omnes_core::error::OmnesError;

/// Errors from the widget and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("relay unreachable: {0}")]
    Transport(String),
    #[error("relay answered with status {0}")]
    Status(u16),
    #[error("relay reply could not be decoded: {0}")]
    Decode(String),
    #[error("no reply from relay within {0:?}")]
    Timeout(Duration),
    #[error("speech error: {0}")]
    Speech(String),
    #[error("mount error: {0}")]
    Mount(String),
}

impl From<WidgetError> for OmnesError {
    fn from(err: WidgetError) -> Self {
        OmnesError::Widget(err.to_string())
    }
}
