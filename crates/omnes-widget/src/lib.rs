//! Omnes widget crate - the client-side assistant controller.
//!
//! Owns the panel visibility, the bounded conversation history, the single
//! in-flight exchange with the relay, and speech input/output. The page is
//! reached only through ports (`ChatView`, `WidgetHost`, `RelayClient`,
//! `RecognizerPort`, `SynthesizerPort`) so the controller runs the same way
//! in a browser shell, a terminal, or a test.

pub mod client;
pub mod controller;
pub mod error;
pub mod factory;
pub mod markup;
pub mod speech;
pub mod state;
pub mod view;

pub use client::{HttpRelayClient, RelayClient};
pub use controller::{SubmitOutcome, WidgetController, WidgetSettings};
pub use error::WidgetError;
pub use factory::{WidgetDeps, WidgetFactory};
pub use speech::{
    RecognitionEvent, RecognizerPort, SpeechCapabilities, SynthesisEvent, SynthesizerPort,
    Utterance,
};
pub use state::{AudioMode, PendingExchange, WidgetState};
pub use view::{ChatView, MessageId, WidgetHost};
