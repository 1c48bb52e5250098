//! # Core Module
//!
//! Configuration and domain error types for the reminder engine.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add typed domain errors
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{Config, ConfigFile};
pub use error::{RegistryError, ScheduleError, VoiceError};
