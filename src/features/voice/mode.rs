//! Interaction mode state machine
//!
//! `Setup` is a one-shot excursion: it is entered only by the operator and
//! every finished recognition session drops back to `Confirmation`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::intent::{classify, Intent};

/// Which interpreter handles the next transcript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Dictating a medication name
    Setup,
    /// Confirming a reminder
    #[default]
    Confirmation,
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMode::Setup => write!(f, "setup"),
            InteractionMode::Confirmation => write!(f, "confirmation"),
        }
    }
}

impl InteractionMode {
    /// Status line shown while a session in this mode is listening
    pub fn listening_status(&self) -> &'static str {
        match self {
            InteractionMode::Setup => {
                "🎤 Listening (Setup Mode)... Say medicine name or 'cancel'."
            }
            InteractionMode::Confirmation => {
                "🎤 Listening (Reminder Mode)... Say 'Done' or 'Repeat'."
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: InteractionMode,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> InteractionMode {
        self.mode
    }

    pub fn enter_setup(&mut self) {
        self.mode = InteractionMode::Setup;
    }

    pub fn enter_confirmation(&mut self) {
        self.mode = InteractionMode::Confirmation;
    }

    /// Classify a transcript under the current mode
    pub fn route(&self, transcript: &str) -> Intent {
        classify(self.mode, transcript)
    }

    /// A recognition session finished (result, error or end); always reverts
    pub fn session_ended(&mut self) {
        self.mode = InteractionMode::Confirmation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_confirmation() {
        let controller = ModeController::new();
        assert_eq!(controller.current(), InteractionMode::Confirmation);
    }

    #[test]
    fn test_setup_is_one_shot() {
        let mut controller = ModeController::new();
        controller.enter_setup();
        assert_eq!(controller.route("add Tylenol"), Intent::AddMedication("Tylenol".into()));

        controller.session_ended();
        assert_eq!(controller.current(), InteractionMode::Confirmation);
        assert_eq!(controller.route("add Tylenol"), Intent::Unrecognized);
    }

    #[test]
    fn test_listening_status_mentions_mode() {
        assert!(InteractionMode::Setup.listening_status().contains("Setup Mode"));
        assert!(InteractionMode::Confirmation
            .listening_status()
            .contains("Reminder Mode"));
    }
}
