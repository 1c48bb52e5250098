//! # Features
//!
//! Medication list, voice interaction, reminder scheduling and the
//! notification boundary.

pub mod medications;
pub mod notify;
pub mod reminders;
pub mod voice;

pub use medications::{AddOutcome, AddSource, MedicationRegistry};
pub use notify::{EngineSnapshot, Notifier, Severity};
pub use reminders::{EscalationTracker, ReminderScheduler, TimerProvider, TokioTimers};
pub use voice::{Intent, InteractionMode, ModeController, RecognitionErrorKind, VoiceGateway};
