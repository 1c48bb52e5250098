//! # Voice Feature
//!
//! Interaction modes, transcript intent classification and the voice
//! gateway boundary.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Intent classification split out of transcript routing
//! - 1.1.0: Setup mode for dictating medication names
//! - 1.0.0: Reminder confirmation by voice

pub mod gateway;
pub mod intent;
pub mod mode;

pub use gateway::{RecognitionErrorKind, VoiceGateway};
pub use intent::{classify, Intent};
pub use mode::{InteractionMode, ModeController};
