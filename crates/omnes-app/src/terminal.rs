//! Terminal rendering of the assistant widget.
//!
//! The terminal has no speech engines, so the talk control is reported as
//! disabled at mount time. Lines cannot be retracted once printed: removing
//! the thinking bubble only forgets it, and replacing it prints the new text.
//! Only placeholders are tracked, and each is forgotten once resolved.

use std::collections::HashSet;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use omnes_core::Role;
use omnes_widget::markup::{WidgetMarkup, PANEL_TITLE};
use omnes_widget::{ChatView, MessageId, WidgetError, WidgetHost};

/// Mounts a [`TerminalView`] on stdout.
pub struct TerminalHost;

impl WidgetHost for TerminalHost {
    fn inject(&self, markup: &WidgetMarkup) -> Result<Arc<dyn ChatView>, WidgetError> {
        tracing::debug!(element_id = markup.element_id, "Mounting terminal widget");
        let view: Arc<dyn ChatView> = Arc::new(TerminalView::default());
        Ok(view)
    }
}

#[derive(Default)]
pub struct TerminalView {
    next_id: AtomicU64,
    /// Placeholders still on screen. Finalized messages are never edited.
    live: Mutex<HashSet<MessageId>>,
}

impl TerminalView {
    fn print(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", line) {
            tracing::debug!(error = %e, "Failed to write to terminal");
        }
    }

    fn allocate_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn track(&self) -> MessageId {
        let id = self.allocate_id();
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        id
    }

    fn untrack(&self, id: MessageId) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "tú",
        Role::Bot => "omnes",
    }
}

impl ChatView for TerminalView {
    fn set_panel_visible(&self, visible: bool) {
        if visible {
            self.print(&format!("--- {} ---", PANEL_TITLE));
        } else {
            self.print("--- (cerrado) ---");
        }
    }

    fn focus_input(&self) {}

    fn set_input(&self, text: &str) {
        self.print(&format!("> {}", text));
    }

    fn clear_input(&self) {}

    fn append_message(&self, role: Role, text: &str) -> MessageId {
        // Typed input is already on screen.
        if role == Role::Bot {
            self.print(&format!("{}> {}", speaker(role), text));
        }
        self.allocate_id()
    }

    fn append_placeholder(&self, text: &str) -> MessageId {
        self.print(&format!("{}> {}", speaker(Role::Bot), text));
        self.track()
    }

    fn remove_message(&self, id: MessageId) -> bool {
        self.untrack(id)
    }

    /// The replacement is final text, so the placeholder stops being tracked.
    fn replace_message(&self, id: MessageId, text: &str) -> bool {
        if !self.untrack(id) {
            return false;
        }
        self.print(&format!("{}> {}", speaker(Role::Bot), text));
        true
    }

    fn set_listening(&self, _listening: bool) {}

    fn disable_voice(&self, label: &str) {
        tracing::debug!(label, "Voice input disabled");
    }
}
