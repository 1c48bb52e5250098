//! # Notifier Feature
//!
//! Status line, activity log and medication list rendering. The engine calls
//! out through [`Notifier`]; nothing calls back in.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::voice::InteractionMode;

/// Log line severity, mirrored onto the `log` facade by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Ok,
    Warn,
    Crit,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Normal => "normal",
            Severity::Ok => "ok",
            Severity::Warn => "warn",
            Severity::Crit => "crit",
        };
        write!(f, "{label}")
    }
}

impl Severity {
    /// Matching `log` level
    pub fn level(&self) -> log::Level {
        match self {
            Severity::Normal | Severity::Ok => log::Level::Info,
            Severity::Warn => log::Level::Warn,
            Severity::Crit => log::Level::Error,
        }
    }
}

/// Point-in-time view of the engine for status requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub status: String,
    pub mode: InteractionMode,
    pub missed_confirmations: u32,
    pub medications: Vec<String>,
    /// Configured `HH:MM` reminder time, if a schedule was started
    pub reminder_time: Option<String>,
    /// Next fire, `YYYY-MM-DD HH:MM` local time
    pub next_fire: Option<String>,
}

/// Display collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn set_status(&self, text: &str);

    async fn append_log(&self, text: &str, severity: Severity);

    async fn clear_log(&self);

    /// Re-render the medication list and its count
    async fn render_medications(&self, medications: &[String]);

    async fn report_snapshot(&self, snapshot: &EngineSnapshot);
}
