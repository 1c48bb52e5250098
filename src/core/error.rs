//! Domain error types shared by the registry, scheduler and voice gateway.

use thiserror::Error;

/// Reasons a reminder schedule could not be started
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Please add at least one medicine before starting the reminder.")]
    NoMedications,

    #[error("Please choose a time for the reminder.")]
    EmptyTime,

    #[error("Invalid time format: '{0}'")]
    InvalidTimeFormat(String),
}

/// Medication registry contract violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Please enter a name for the medication.")]
    EmptyName,

    #[error("Medication index {index} out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Failures reported by a voice gateway when a session cannot begin
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("no speech client is attached")]
    NoListener,
}
