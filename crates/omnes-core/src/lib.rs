//! Omnes core crate - shared wire types, bounded conversation history,
//! configuration, and the top-level error type used by the relay and widget.

pub mod config;
pub mod error;
pub mod types;

pub use config::OmnesConfig;
pub use error::{OmnesError, Result};
pub use types::*;
