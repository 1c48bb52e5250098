//! # Feature: Medication Registry
//!
//! Ordered, de-duplicated list of medication names. Insertion order is the
//! order the reminder speaks them in.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Voice-sourced adds report a retry prompt instead of an error
//! - 1.0.0: Initial release

use crate::core::RegistryError;

/// Where a medication name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddSource {
    Typed,
    Voice,
}

/// Result of a non-failing add
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(String),
    Duplicate(String),
    /// Voice input produced an empty name; ask the speaker again
    PromptRetry,
}

#[derive(Debug, Clone, Default)]
pub struct MedicationRegistry {
    names: Vec<String>,
}

impl MedicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a seed list, skipping blanks and repeats
    pub fn seeded<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in seed {
            let _ = registry.add(name.as_ref(), AddSource::Typed);
        }
        registry
    }

    /// Add a medication. Duplicate detection is an exact, case-sensitive match.
    pub fn add(&mut self, name: &str, source: AddSource) -> Result<AddOutcome, RegistryError> {
        let name = name.trim();

        if name.is_empty() {
            return match source {
                AddSource::Voice => Ok(AddOutcome::PromptRetry),
                AddSource::Typed => Err(RegistryError::EmptyName),
            };
        }

        if self.contains(name) {
            return Ok(AddOutcome::Duplicate(name.to_string()));
        }

        self.names.push(name.to_string());
        Ok(AddOutcome::Added(name.to_string()))
    }

    /// Remove by position, returning the removed name
    pub fn remove(&mut self, index: usize) -> Result<String, RegistryError> {
        if index >= self.names.len() {
            return Err(RegistryError::IndexOutOfRange {
                index,
                len: self.names.len(),
            });
        }
        Ok(self.names.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Spoken form of the list, or None when empty
    pub fn enumerate(&self) -> Option<String> {
        enumerate_for_speech(&self.names)
    }
}

/// Join names for speech: "A", "A, and B", "A, then B, and C"
pub fn enumerate_for_speech(names: &[String]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(only.clone()),
        [head @ .., last] => Some(format!("{}, and {}", head.join(", then "), last)),
    }
}
