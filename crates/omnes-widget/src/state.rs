//! Observable widget state and the pending-exchange slot.
//!
//! Visibility and the in-flight exchange are tracked independently; the
//! observable state is derived from both:
//! - Closed: panel hidden (an exchange may still be in flight)
//! - Idle: panel visible, no exchange in flight
//! - Awaiting: panel visible, one exchange in flight

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::view::MessageId;

/// Observable state of one widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetState {
    /// Panel hidden.
    Closed,
    /// Panel visible, ready for a submission.
    Idle,
    /// Panel visible, one relay request outstanding.
    Awaiting,
}

impl WidgetState {
    pub(crate) fn derive(open: bool, pending: bool) -> Self {
        match (open, pending) {
            (false, _) => WidgetState::Closed,
            (true, false) => WidgetState::Idle,
            (true, true) => WidgetState::Awaiting,
        }
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetState::Closed => write!(f, "Closed"),
            WidgetState::Idle => write!(f, "Idle"),
            WidgetState::Awaiting => write!(f, "Awaiting"),
        }
    }
}

/// Exclusive speech I/O mode. Listening and speaking never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioMode {
    #[default]
    Silent,
    Speaking,
    Listening,
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioMode::Silent => write!(f, "Silent"),
            AudioMode::Speaking => write!(f, "Speaking"),
            AudioMode::Listening => write!(f, "Listening"),
        }
    }
}

/// The in-flight exchange and its "thinking" placeholder.
///
/// The slot is claimed before the placeholder is rendered, so `placeholder`
/// is briefly `None` right after a submission is accepted.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    /// Unique identifier for this exchange.
    pub id: Uuid,
    /// View handle of the placeholder message, once rendered.
    pub placeholder: Option<MessageId>,
    /// When the request was issued.
    pub started_at: DateTime<Utc>,
}

impl PendingExchange {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            placeholder: None,
            started_at: Utc::now(),
        }
    }

    /// Milliseconds since the request was issued.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

impl Default for PendingExchange {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(WidgetState::Closed.to_string(), "Closed");
        assert_eq!(WidgetState::Idle.to_string(), "Idle");
        assert_eq!(WidgetState::Awaiting.to_string(), "Awaiting");
        assert_eq!(AudioMode::Listening.to_string(), "Listening");
    }

    #[test]
    fn test_derive_state() {
        assert_eq!(WidgetState::derive(false, false), WidgetState::Closed);
        assert_eq!(WidgetState::derive(false, true), WidgetState::Closed);
        assert_eq!(WidgetState::derive(true, false), WidgetState::Idle);
        assert_eq!(WidgetState::derive(true, true), WidgetState::Awaiting);
    }

    #[test]
    fn test_audio_mode_default_is_silent() {
        assert_eq!(AudioMode::default(), AudioMode::Silent);
    }

    #[test]
    fn test_pending_exchange_ids_are_unique() {
        let a = PendingExchange::new();
        let b = PendingExchange::new();
        assert_ne!(a.id, b.id);
        assert!(a.placeholder.is_none());
        assert!(a.elapsed_ms() >= 0);
    }
}
