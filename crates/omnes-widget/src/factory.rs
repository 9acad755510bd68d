//! Idempotent widget mounting.

use std::sync::{Arc, Mutex, PoisonError};

use crate::client::RelayClient;
use crate::controller::{WidgetController, WidgetSettings};
use crate::error::WidgetError;
use crate::markup::WidgetMarkup;
use crate::speech::SpeechCapabilities;
use crate::view::WidgetHost;

/// Collaborators a widget needs besides the host page.
#[derive(Clone)]
pub struct WidgetDeps {
    pub relay: Arc<dyn RelayClient>,
    pub speech: SpeechCapabilities,
    pub settings: WidgetSettings,
}

impl WidgetDeps {
    pub fn new(relay: Arc<dyn RelayClient>) -> Self {
        Self {
            relay,
            speech: SpeechCapabilities::none(),
            settings: WidgetSettings::default(),
        }
    }

    pub fn with_speech(mut self, speech: SpeechCapabilities) -> Self {
        self.speech = speech;
        self
    }

    pub fn with_settings(mut self, settings: WidgetSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Mounts at most one widget per factory.
///
/// The first successful `mount` injects the markup into the host; every later
/// call returns the same controller without touching the host again.
#[derive(Default)]
pub struct WidgetFactory {
    mounted: Mutex<Option<WidgetController>>,
}

impl WidgetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(
        &self,
        host: &dyn WidgetHost,
        deps: WidgetDeps,
    ) -> Result<WidgetController, WidgetError> {
        let mut mounted = self.mounted.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = mounted.as_ref() {
            tracing::debug!("Widget already mounted; reusing instance");
            return Ok(existing.clone());
        }

        let view = host.inject(&WidgetMarkup::default())?;
        let controller = WidgetController::new(view, deps.relay, deps.speech, deps.settings);
        controller.attach_speech();

        tracing::info!(
            history_capacity = controller.settings().history_capacity,
            "Assistant widget mounted"
        );
        *mounted = Some(controller.clone());
        Ok(controller)
    }

    /// The mounted controller, if any.
    pub fn mounted(&self) -> Option<WidgetController> {
        self.mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
