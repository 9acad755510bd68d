//! Rendering ports.
//!
//! `WidgetHost` is the page the widget is mounted into; `ChatView` is the
//! set of element references created once at mount time. Every method is
//! infallible from the controller's point of view: a view whose nodes were
//! removed by the page reports `false` and the controller carries on.

use std::fmt;
use std::sync::Arc;

use omnes_core::Role;

use crate::error::WidgetError;
use crate::markup::WidgetMarkup;

/// Handle of one rendered message in the chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Element references of a mounted widget.
pub trait ChatView: Send + Sync {
    /// Show or hide the chat panel.
    fn set_panel_visible(&self, visible: bool);

    /// Move keyboard focus to the text input.
    fn focus_input(&self);

    /// Replace the text input contents.
    fn set_input(&self, text: &str);

    /// Empty the text input.
    fn clear_input(&self);

    /// Append a finalized message to the log and scroll to it.
    fn append_message(&self, role: Role, text: &str) -> MessageId;

    /// Append the transient "thinking" bubble.
    fn append_placeholder(&self, text: &str) -> MessageId;

    /// Remove a message. Returns `false` if it no longer exists.
    fn remove_message(&self, id: MessageId) -> bool;

    /// Replace a message's text. Returns `false` if it no longer exists.
    fn replace_message(&self, id: MessageId, text: &str) -> bool;

    /// Highlight the talk control while a recognition session is active.
    fn set_listening(&self, listening: bool);

    /// Disable the talk control with an explanatory label.
    fn disable_voice(&self, label: &str);
}

/// The page a widget is mounted into.
pub trait WidgetHost: Send + Sync {
    /// Attach the widget's stylesheet and markup and return references to
    /// the created elements.
    fn inject(&self, markup: &WidgetMarkup) -> Result<Arc<dyn ChatView>, WidgetError>;
}
