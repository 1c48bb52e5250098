//! Voice I/O gateway boundary
//!
//! The engine never talks to a speech engine directly. It asks a
//! [`VoiceGateway`] to speak or to open a listening session; recognition
//! results come back later as engine events.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::VoiceError;

/// Speech synthesis and recognition collaborator
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Queue an utterance. Never blocks on playback.
    async fn speak(&self, text: &str);

    /// Drop any in-flight or queued utterance
    async fn cancel_speech(&self);

    /// Open a single recognition session
    async fn start_listening(&self) -> Result<(), VoiceError>;
}

/// Error classes reported by a recognition session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionErrorKind {
    PermissionDenied,
    ServiceDenied,
    NoSpeech,
    Other(String),
}

impl RecognitionErrorKind {
    /// Microphone access was refused; the notice must stay on screen
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            RecognitionErrorKind::PermissionDenied | RecognitionErrorKind::ServiceDenied
        )
    }
}

impl From<&str> for RecognitionErrorKind {
    fn from(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "permission-denied" | "not-allowed" => RecognitionErrorKind::PermissionDenied,
            "service-denied" | "service-not-allowed" => RecognitionErrorKind::ServiceDenied,
            "no-speech" => RecognitionErrorKind::NoSpeech,
            other => RecognitionErrorKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionErrorKind::PermissionDenied => write!(f, "permission-denied"),
            RecognitionErrorKind::ServiceDenied => write!(f, "service-denied"),
            RecognitionErrorKind::NoSpeech => write!(f, "no-speech"),
            RecognitionErrorKind::Other(class) => write!(f, "{class}"),
        }
    }
}
