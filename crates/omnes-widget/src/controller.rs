//! Widget controller: panel visibility, single-flight exchanges, and speech.
//!
//! `WidgetController` is a cheap cloneable handle. Its session state sits
//! behind a mutex that is never held across an await or while the view is
//! called, so a second `submit` issued while a reply is outstanding observes
//! the pending exchange and is ignored, and a view may read controller state
//! from inside its callbacks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use uuid::Uuid;

use omnes_core::config::WidgetConfig;
use omnes_core::{ConversationHistory, ConversationTurn, RelayReply, RelayRequest, Role};

use crate::client::RelayClient;
use crate::error::WidgetError;
use crate::markup::{CONNECTION_APOLOGY, THINKING_TEXT, VOICE_UNSUPPORTED_LABEL};
use crate::speech::{RecognitionEvent, SpeechCapabilities, SynthesisEvent, Utterance};
use crate::state::{AudioMode, PendingExchange, WidgetState};
use crate::view::{ChatView, MessageId};

/// Tunables for one widget instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSettings {
    /// Turns retained in history.
    pub history_capacity: usize,
    /// Upper bound on one relay exchange. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Language tag for synthesized replies.
    pub speech_lang: String,
    /// Speech synthesis rate.
    pub speech_rate: f32,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self::from(&WidgetConfig::default())
    }
}

impl From<&WidgetConfig> for WidgetSettings {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            history_capacity: config.history_capacity,
            request_timeout: (config.request_timeout_secs > 0)
                .then(|| Duration::from_secs(config.request_timeout_secs)),
            speech_lang: config.speech_lang.clone(),
            speech_rate: config.speech_rate,
        }
    }
}

/// Result of one `submit` call.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Input was empty after trimming; nothing happened.
    Rejected,
    /// Another exchange was in flight; nothing happened.
    Ignored,
    /// The relay replied; the reply was rendered and recorded.
    Replied(String),
    /// The exchange failed; the apology replaced the placeholder.
    Failed(WidgetError),
}

impl SubmitOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, SubmitOutcome::Replied(_))
    }
}

struct Session {
    open: bool,
    history: ConversationHistory,
    pending: Option<PendingExchange>,
    audio: AudioMode,
    /// Utterances handed to the synthesizer whose `PlaybackEnded` has not
    /// arrived yet.
    utterances: u32,
}

impl Session {
    /// Take the pending slot if it still belongs to exchange `id`.
    fn take_pending(&mut self, id: Uuid) -> Option<PendingExchange> {
        match &self.pending {
            Some(pending) if pending.id == id => self.pending.take(),
            _ => None,
        }
    }
}

struct Inner {
    view: Arc<dyn ChatView>,
    relay: Arc<dyn RelayClient>,
    speech: SpeechCapabilities,
    settings: WidgetSettings,
    session: Mutex<Session>,
}

impl Inner {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to one mounted assistant widget.
#[derive(Clone)]
pub struct WidgetController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for WidgetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetController")
            .field("state", &self.state())
            .field("audio", &self.audio_mode())
            .field("history_len", &self.inner.session().history.len())
            .field("speech", &self.inner.speech)
            .finish()
    }
}

impl WidgetController {
    /// Build a controller over an already-injected view. Use
    /// [`crate::WidgetFactory::mount`] to get one attached to a host.
    pub(crate) fn new(
        view: Arc<dyn ChatView>,
        relay: Arc<dyn RelayClient>,
        speech: SpeechCapabilities,
        settings: WidgetSettings,
    ) -> Self {
        let session = Session {
            open: false,
            history: ConversationHistory::new(settings.history_capacity),
            pending: None,
            audio: AudioMode::Silent,
            utterances: 0,
        };
        Self {
            inner: Arc::new(Inner {
                view,
                relay,
                speech,
                settings,
                session: Mutex::new(session),
            }),
        }
    }

    /// Wire speech controls: disable the talk control when recognition is
    /// unsupported, then start consuming events from each available engine.
    pub(crate) fn attach_speech(&self) {
        let speech = &self.inner.speech;
        if !speech.can_listen() {
            self.inner.view.disable_voice(VOICE_UNSUPPORTED_LABEL);
            tracing::info!("Speech recognition unavailable; voice input disabled");
        }
        if !speech.can_listen() && !speech.can_speak() {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime at mount time; speech events will not be handled");
            return;
        };
        if let Some(recognizer) = &speech.recognition {
            handle.spawn(pump_events(
                Arc::downgrade(&self.inner),
                recognizer.subscribe(),
                "recognition",
                WidgetController::handle_recognition_event,
            ));
        }
        if let Some(synth) = &speech.synthesis {
            handle.spawn(pump_events(
                Arc::downgrade(&self.inner),
                synth.subscribe(),
                "synthesis",
                WidgetController::handle_synthesis_event,
            ));
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> WidgetState {
        let session = self.inner.session();
        WidgetState::derive(session.open, session.pending.is_some())
    }

    pub fn is_open(&self) -> bool {
        self.inner.session().open
    }

    /// Snapshot of the retained turns, oldest first.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.inner.session().history.turns()
    }

    pub fn pending(&self) -> Option<PendingExchange> {
        self.inner.session().pending.clone()
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.inner.session().audio
    }

    pub fn is_listening(&self) -> bool {
        self.audio_mode() == AudioMode::Listening
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.inner.settings
    }

    /// Whether both handles refer to the same widget instance.
    pub fn same_instance(&self, other: &WidgetController) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    /// Flip panel visibility. Returns whether the panel is now open.
    pub fn toggle(&self) -> bool {
        if self.is_open() {
            self.close();
            false
        } else {
            self.open();
            true
        }
    }

    pub fn open(&self) {
        self.set_open(true);
        self.inner.view.focus_input();
    }

    /// Hide the panel. An in-flight exchange keeps running.
    pub fn close(&self) {
        self.set_open(false);
    }

    fn set_open(&self, open: bool) {
        let (before, after) = {
            let mut session = self.inner.session();
            let before = WidgetState::derive(session.open, session.pending.is_some());
            session.open = open;
            (before, WidgetState::derive(open, session.pending.is_some()))
        };
        self.inner.view.set_panel_visible(open);
        if before != after {
            tracing::debug!("Widget state: {} -> {}", before, after);
        }
    }

    // -------------------------------------------------------------------------
    // Exchanges
    // -------------------------------------------------------------------------

    /// Submit one user message and wait for the relay's answer.
    ///
    /// Dropping the returned future before it completes releases the pending
    /// slot and shows the apology, as if the exchange had failed.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let message = text.trim();
        if message.is_empty() {
            tracing::debug!("Ignoring empty submission");
            return SubmitOutcome::Rejected;
        }

        let (request, id) = {
            let mut session = self.inner.session();
            if let Some(pending) = &session.pending {
                tracing::debug!(
                    pending_id = %pending.id,
                    "Submission ignored while an exchange is in flight"
                );
                return SubmitOutcome::Ignored;
            }

            session.history.push(ConversationTurn::user(message));
            let request = RelayRequest {
                message: message.to_string(),
                history: session.history.all_but_last(),
            };
            let exchange = PendingExchange::new();
            let id = exchange.id;
            session.pending = Some(exchange);
            (request, id)
        };

        let view = &self.inner.view;
        view.clear_input();
        view.append_message(Role::User, message);
        let placeholder = view.append_placeholder(THINKING_TEXT);
        if let Some(pending) = self.inner.session().pending.as_mut() {
            pending.placeholder = Some(placeholder);
        }

        let mut guard = ExchangeGuard {
            inner: &*self.inner,
            id,
            placeholder,
            armed: true,
        };
        tracing::debug!(
            exchange_id = %id,
            history_len = request.history.len(),
            "Sending message to relay"
        );

        let result = self.send(&request).await;
        guard.armed = false;

        let exchange = {
            let mut session = self.inner.session();
            if let Ok(RelayReply { reply }) = &result {
                session.history.push(ConversationTurn::bot(reply.clone()));
            }
            session.take_pending(id)
        };
        if let Some(exchange) = &exchange {
            tracing::debug!(
                exchange_id = %exchange.id,
                elapsed_ms = exchange.elapsed_ms(),
                ok = result.is_ok(),
                "Exchange finished"
            );
        }

        match result {
            Ok(RelayReply { reply }) => {
                if !view.remove_message(placeholder) {
                    tracing::debug!(placeholder = %placeholder, "Placeholder already removed");
                }
                view.append_message(Role::Bot, &reply);
                self.speak(&reply);
                SubmitOutcome::Replied(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Assistant exchange failed");
                if !view.replace_message(placeholder, CONNECTION_APOLOGY) {
                    tracing::debug!(placeholder = %placeholder, "Placeholder already removed");
                }
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, WidgetError> {
        let exchange = self.inner.relay.send(request);
        match self.inner.settings.request_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| WidgetError::Timeout(limit))?,
            None => exchange.await,
        }
    }

    // -------------------------------------------------------------------------
    // Speech
    // -------------------------------------------------------------------------

    /// Start one recognition session. Stops playback first.
    ///
    /// Returns `false` without side effects when recognition is unsupported
    /// or a session is already active.
    pub fn start_voice_input(&self) -> bool {
        let Some(recognizer) = &self.inner.speech.recognition else {
            tracing::debug!("Voice input requested but recognition is unsupported");
            return false;
        };

        {
            let mut session = self.inner.session();
            if session.audio == AudioMode::Listening {
                return false;
            }
            session.audio = AudioMode::Listening;
        }

        // Recognition was not active, so stopping playback is all stop_all would do.
        if let Some(synth) = &self.inner.speech.synthesis {
            synth.cancel();
        }

        self.inner.view.set_listening(true);
        if let Err(e) = recognizer.start() {
            tracing::warn!(error = %e, "Failed to start speech recognition");
            self.end_listening();
            return false;
        }
        tracing::debug!("Speech recognition started");
        true
    }

    /// Cancel playback and any active recognition session. Idempotent.
    pub fn stop_all(&self) {
        if let Some(synth) = &self.inner.speech.synthesis {
            synth.cancel();
        }

        let was_listening = {
            let mut session = self.inner.session();
            let was_listening = session.audio == AudioMode::Listening;
            session.audio = AudioMode::Silent;
            was_listening
        };

        if was_listening {
            if let Some(recognizer) = &self.inner.speech.recognition {
                recognizer.stop();
            }
            self.inner.view.set_listening(false);
        }
    }

    fn speak(&self, text: &str) {
        let Some(synth) = &self.inner.speech.synthesis else {
            return;
        };
        self.stop_all();
        {
            let mut session = self.inner.session();
            session.utterances += 1;
            session.audio = AudioMode::Speaking;
        }
        synth.speak(Utterance {
            text: text.to_string(),
            lang: self.inner.settings.speech_lang.clone(),
            rate: self.inner.settings.speech_rate,
        });
    }

    fn end_listening(&self) {
        let was_listening = {
            let mut session = self.inner.session();
            let was_listening = session.audio == AudioMode::Listening;
            if was_listening {
                session.audio = AudioMode::Silent;
            }
            was_listening
        };
        if was_listening {
            self.inner.view.set_listening(false);
        }
    }

    /// React to one recognition event.
    ///
    /// A transcript is placed in the input and submitted on a separate task so
    /// that the session-ended event is not held up by the relay round trip.
    fn handle_recognition_event(&self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::TranscriptReady(text) => {
                tracing::debug!(chars = text.chars().count(), "Transcript ready");
                self.inner.view.set_input(&text);
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.submit(&text).await;
                });
            }
            RecognitionEvent::SessionEnded => self.end_listening(),
        }
    }

    /// Playback is over once every spoken utterance has reported its end.
    fn handle_synthesis_event(&self, event: SynthesisEvent) {
        match event {
            SynthesisEvent::PlaybackEnded => {
                let mut session = self.inner.session();
                session.utterances = session.utterances.saturating_sub(1);
                if session.utterances == 0 && session.audio == AudioMode::Speaking {
                    session.audio = AudioMode::Silent;
                    tracing::debug!("Playback finished");
                }
            }
        }
    }
}

/// Owns the pending slot of one exchange while the relay call is awaited.
///
/// If the `submit` future is dropped mid-flight the guard is still armed, so
/// the slot is released and the placeholder turns into the apology.
struct ExchangeGuard<'a> {
    inner: &'a Inner,
    id: Uuid,
    placeholder: MessageId,
    armed: bool,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let released = self.inner.session().take_pending(self.id).is_some();
        if released {
            tracing::warn!(exchange_id = %self.id, "Exchange abandoned before the relay answered");
            self.inner.view.replace_message(self.placeholder, CONNECTION_APOLOGY);
        }
    }
}

async fn pump_events<E>(
    inner: Weak<Inner>,
    mut events: broadcast::Receiver<E>,
    source: &'static str,
    handle: fn(&WidgetController, E),
) where
    E: Clone + Send + 'static,
{
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(source, skipped, "Speech events dropped");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let Some(strong) = inner.upgrade() else {
            break;
        };
        handle(&WidgetController { inner: strong }, event);
    }
    tracing::debug!(source, "Speech event listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = WidgetConfig {
            history_capacity: 4,
            request_timeout_secs: 10,
            ..WidgetConfig::default()
        };
        let settings = WidgetSettings::from(&config);
        assert_eq!(settings.history_capacity, 4);
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(10)));
        assert_eq!(settings.speech_lang, "es-CL");
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let config = WidgetConfig {
            request_timeout_secs: 0,
            ..WidgetConfig::default()
        };
        assert_eq!(WidgetSettings::from(&config).request_timeout, None);
    }

    #[test]
    fn test_submit_outcome_is_replied() {
        assert!(SubmitOutcome::Replied("hola".to_string()).is_replied());
        assert!(!SubmitOutcome::Ignored.is_replied());
        assert!(!SubmitOutcome::Failed(WidgetError::Status(502)).is_replied());
    }
}
