//! # Medications Feature
//!
//! In-memory medication list backing the reminder.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod registry;

pub use registry::{enumerate_for_speech, AddOutcome, AddSource, MedicationRegistry};
