//! # Reminders Feature
//!
//! Daily medication reminder scheduling with missed-confirmation escalation.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod escalation;
pub mod schedule;
pub mod scheduler;
pub mod timer;

pub use escalation::{EscalationTier, EscalationTracker};
pub use schedule::{
    compute_next_fire, format_clock, parse_time_of_day, whole_minutes, REPEAT_PERIOD,
};
pub use scheduler::{FireOutcome, ReminderScheduler, ScheduleHandle, ScheduledReminder};
pub use timer::{TimerFire, TimerHandle, TimerKind, TimerProvider, TokioTimers};
