//! # Configuration
//!
//! Environment-driven settings with an optional YAML overlay for the
//! medication seed list and default reminder time.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Added `voicecare.yaml` overlay for medications and reminder time
//! - 1.0.0: Initial env-based configuration

use anyhow::{anyhow, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::features::reminders::parse_time_of_day;

/// Default Unix socket for operator/voice clients
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/voicecare.sock";

/// Config file picked up from the working directory when VOICECARE_CONFIG is unset
pub const DEFAULT_CONFIG_FILE: &str = "voicecare.yaml";

const DEFAULT_REMINDER_TIME: &str = "18:00";
const DEFAULT_MEDICATION: &str = "Metformin 500mg";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub socket_path: String,
    pub reminder_time: String,
    pub medications: Vec<String>,
}

/// On-disk overlay, every key optional
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub medications: Option<Vec<String>>,
    #[serde(default)]
    pub reminder_time: Option<String>,
}

impl ConfigFile {
    /// Load and validate a YAML overlay
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_yaml::from_str(&contents)?;
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref time) = self.reminder_time {
            parse_time_of_day(time)
                .map_err(|e| anyhow!("Invalid reminder_time in config: {}", e))?;
        }

        if let Some(ref meds) = self.medications {
            let mut seen: Vec<&str> = Vec::with_capacity(meds.len());
            for med in meds {
                let name = med.trim();
                if name.is_empty() {
                    return Err(anyhow!("Medication names in config must not be empty"));
                }
                if seen.contains(&name) {
                    return Err(anyhow!("Duplicate medication in config: {}", name));
                }
                seen.push(name);
            }
        }

        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let reminder_time =
            env::var("VOICECARE_REMINDER_TIME").unwrap_or_else(|_| DEFAULT_REMINDER_TIME.to_string());
        parse_time_of_day(&reminder_time)
            .map_err(|e| anyhow!("VOICECARE_REMINDER_TIME: {}", e))?;

        let mut config = Config {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            socket_path: env::var("VOICECARE_IPC_SOCKET")
                .unwrap_or_else(|_| DEFAULT_SOCKET_PATH.to_string()),
            reminder_time,
            medications: env::var("VOICECARE_MEDICATIONS")
                .map(|raw| parse_medication_list(&raw))
                .unwrap_or_else(|_| vec![DEFAULT_MEDICATION.to_string()]),
        };

        match env::var("VOICECARE_CONFIG") {
            Ok(path) => {
                let file = ConfigFile::load(&path)?;
                config.apply(file);
                info!("Loaded config overlay from {path}");
            }
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                let file = ConfigFile::load(DEFAULT_CONFIG_FILE)?;
                config.apply(file);
                info!("Loaded config overlay from {DEFAULT_CONFIG_FILE}");
            }
            Err(_) => {}
        }

        Ok(config)
    }

    /// Overlay values from a config file onto env-derived settings
    pub fn apply(&mut self, file: ConfigFile) {
        if let Some(meds) = file.medications {
            self.medications = meds.into_iter().map(|m| m.trim().to_string()).collect();
        }
        if let Some(time) = file.reminder_time {
            self.reminder_time = time.trim().to_string();
        }
    }
}

/// Split a comma separated seed list, dropping blanks and repeats
fn parse_medication_list(raw: &str) -> Vec<String> {
    let mut meds: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !meds.iter().any(|m| m == name) {
            meds.push(name.to_string());
        }
    }
    meds
}
