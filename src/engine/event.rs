//! Inbound engine events
//!
//! Operator actions, recognition results and timer fires all arrive as one
//! [`Event`] stream and are handled strictly one at a time.

use crate::features::reminders::TimerFire;
use crate::features::voice::RecognitionErrorKind;

/// Operator-initiated actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Typed medication name
    AddMedication { name: String },
    RemoveMedication { index: usize },
    StartReminder { time: String },
    /// Enter setup mode and dictate a medication name
    AddMedicationByVoice,
    /// Listen for the patient's reply to a reminder
    RespondToReminder,
    RequestStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    UiActionInvoked(UiAction),
    TranscriptReceived(String),
    RecognitionErrorOccurred(RecognitionErrorKind),
    /// The recognition session closed, whatever its outcome
    RecognitionEnded,
    TimerFired(TimerFire),
    Shutdown,
}

impl From<UiAction> for Event {
    fn from(action: UiAction) -> Self {
        Event::UiActionInvoked(action)
    }
}

impl From<TimerFire> for Event {
    fn from(fire: TimerFire) -> Self {
        Event::TimerFired(fire)
    }
}
