//! Shared domain and wire types.
//!
//! These types are exchanged between the widget and the relay as JSON:
//! - `RelayRequest`: `{ "message": "...", "history": [{ "role": "user", "content": "..." }] }`
//! - `RelayReply`: `{ "reply": "..." }`

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of turns retained in a widget's conversation history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 12;

// =============================================================================
// Conversation turns
// =============================================================================

/// Author of a conversation turn as seen by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

/// One finalized message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
        }
    }
}

// =============================================================================
// ConversationHistory
// =============================================================================

/// Bounded, chronologically ordered sequence of turns.
///
/// Pushing a turn onto a full history evicts the oldest turn first, whatever
/// its role, so `len()` never exceeds `capacity()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ConversationHistory {
    /// Create an empty history. A capacity of zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a turn, evicting the oldest one if the history is full.
    ///
    /// Returns the evicted turn, if any.
    pub fn push(&mut self, turn: ConversationTurn) -> Option<ConversationTurn> {
        let evicted = if self.turns.len() >= self.capacity {
            self.turns.pop_front()
        } else {
            None
        };
        self.turns.push_back(turn);
        evicted
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained turns, oldest first.
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    /// Retained turns excluding the most recently pushed one.
    pub fn all_but_last(&self) -> Vec<ConversationTurn> {
        let keep = self.turns.len().saturating_sub(1);
        self.turns.iter().take(keep).cloned().collect()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.back()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

// =============================================================================
// Relay wire types
// =============================================================================

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

/// Response body of `POST /api/chat`. Failures are also carried as `reply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    pub reply: String,
}

impl RelayReply {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Bot).unwrap(), "\"bot\"");
        assert_eq!(Role::Bot.to_string(), "bot");
    }

    #[test]
    fn test_history_respects_capacity() {
        let mut history = ConversationHistory::new(3);
        for i in 0..10 {
            history.push(ConversationTurn::user(format!("m{}", i)));
            assert!(history.len() <= 3);
        }
        let contents: Vec<String> = history.turns().into_iter().map(|t| t.content).collect();
        assert_eq!(contents, vec!["m7", "m8", "m9"]);
    }

    #[test]
    fn test_history_evicts_oldest_regardless_of_role() {
        let mut history = ConversationHistory::new(2);
        history.push(ConversationTurn::bot("first"));
        history.push(ConversationTurn::user("second"));
        let evicted = history.push(ConversationTurn::user("third"));
        assert_eq!(evicted, Some(ConversationTurn::bot("first")));
        assert_eq!(history.turns()[0], ConversationTurn::user("second"));
    }

    #[test]
    fn test_history_push_below_capacity_evicts_nothing() {
        let mut history = ConversationHistory::new(2);
        assert_eq!(history.push(ConversationTurn::user("a")), None);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_history_zero_capacity_is_clamped() {
        let mut history = ConversationHistory::new(0);
        assert_eq!(history.capacity(), 1);
        history.push(ConversationTurn::user("a"));
        history.push(ConversationTurn::user("b"));
        assert_eq!(history.turns(), vec![ConversationTurn::user("b")]);
    }

    #[test]
    fn test_all_but_last() {
        let mut history = ConversationHistory::default();
        assert!(history.all_but_last().is_empty());

        history.push(ConversationTurn::user("Hola"));
        assert!(history.all_but_last().is_empty());

        history.push(ConversationTurn::bot("¡Hola!"));
        history.push(ConversationTurn::user("¿Servicios?"));
        assert_eq!(
            history.all_but_last(),
            vec![ConversationTurn::user("Hola"), ConversationTurn::bot("¡Hola!")]
        );
        assert_eq!(history.last(), Some(&ConversationTurn::user("¿Servicios?")));
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(ConversationHistory::default().capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_relay_request_history_defaults_to_empty() {
        let req: RelayRequest = serde_json::from_str(r#"{"message":"hola"}"#).unwrap();
        assert_eq!(req.message, "hola");
        assert!(req.history.is_empty());
    }

    #[test]
    fn test_relay_request_requires_message() {
        let result = serde_json::from_str::<RelayRequest>(r#"{"history":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_relay_request_wire_format() {
        let req = RelayRequest {
            message: "¿Cuáles son sus servicios?".to_string(),
            history: vec![ConversationTurn::user("Hola"), ConversationTurn::bot("¡Hola!")],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["history"][0]["role"], "user");
        assert_eq!(value["history"][1]["role"], "bot");
        assert_eq!(value["message"], "¿Cuáles son sus servicios?");
    }

    #[test]
    fn test_relay_reply_wire_format() {
        let reply: RelayReply = serde_json::from_str(r#"{"reply":"ok"}"#).unwrap();
        assert_eq!(reply, RelayReply::new("ok"));
    }
}
