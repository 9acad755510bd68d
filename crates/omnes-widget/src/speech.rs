//! Optional speech capabilities.
//!
//! Both engines report back as events on broadcast channels that the
//! controller subscribes to: recognition emits `TranscriptReady` then
//! `SessionEnded`, synthesis emits `PlaybackEnded`. Either port may be absent,
//! in which case the matching control is disabled instead of failing the
//! widget.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::WidgetError;

/// Events emitted by a recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// A final transcript for the utterance.
    TranscriptReady(String),
    /// The session is over, with or without a transcript.
    SessionEnded,
}

/// A single-utterance speech recognizer.
pub trait RecognizerPort: Send + Sync {
    /// Begin one recognition session.
    fn start(&self) -> Result<(), WidgetError>;

    /// Stop the active session, if any.
    fn stop(&self);

    /// Subscribe to recognition events.
    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent>;
}

/// Text to speak, with voice parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
}

/// Events emitted by a speech synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    /// Playback stopped, either completed or cancelled.
    PlaybackEnded,
}

/// A speech synthesizer.
pub trait SynthesizerPort: Send + Sync {
    /// Start speaking. Returns immediately.
    fn speak(&self, utterance: Utterance);

    /// Cancel any ongoing or queued playback.
    fn cancel(&self);

    /// Subscribe to playback events.
    fn subscribe(&self) -> broadcast::Receiver<SynthesisEvent>;
}

/// The speech ports available to a widget.
#[derive(Clone, Default)]
pub struct SpeechCapabilities {
    pub recognition: Option<Arc<dyn RecognizerPort>>,
    pub synthesis: Option<Arc<dyn SynthesizerPort>>,
}

impl SpeechCapabilities {
    /// No speech support at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(
        recognition: Option<Arc<dyn RecognizerPort>>,
        synthesis: Option<Arc<dyn SynthesizerPort>>,
    ) -> Self {
        Self {
            recognition,
            synthesis,
        }
    }

    pub fn can_listen(&self) -> bool {
        self.recognition.is_some()
    }

    pub fn can_speak(&self) -> bool {
        self.synthesis.is_some()
    }
}

impl std::fmt::Debug for SpeechCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechCapabilities")
            .field("recognition", &self.can_listen())
            .field("synthesis", &self.can_speak())
            .finish()
    }
}
