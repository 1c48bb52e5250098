//! Missed-confirmation escalation

/// Count at which the second-reminder warning is issued
pub const SECOND_REMINDER_AT: u32 = 2;

/// Count from which every dispatch raises the critical alert
pub const CRITICAL_AT: u32 = 3;

/// Alert raised by a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationTier {
    SecondReminder,
    Critical,
}

/// Counts reminders the patient has not confirmed yet
#[derive(Debug, Clone, Default)]
pub struct EscalationTracker {
    missed: u32,
}

impl EscalationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missed(&self) -> u32 {
        self.missed
    }

    /// Count one dispatched reminder and report the tiers it crosses
    pub fn record_dispatch(&mut self) -> Vec<EscalationTier> {
        self.missed = self.missed.saturating_add(1);

        let mut tiers = Vec::new();
        if self.missed == SECOND_REMINDER_AT {
            tiers.push(EscalationTier::SecondReminder);
        }
        if self.missed >= CRITICAL_AT {
            tiers.push(EscalationTier::Critical);
        }
        tiers
    }

    /// Patient confirmed; returns the count that was cleared
    pub fn confirm(&mut self) -> u32 {
        std::mem::take(&mut self.missed)
    }

    /// Fresh schedule, nothing missed yet
    pub fn reset(&mut self) {
        self.missed = 0;
    }
}
