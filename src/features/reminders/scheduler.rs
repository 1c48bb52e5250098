//! # Feature: Reminder Scheduler
//!
//! Arms the first reminder at a wall-clock time of day, then a fixed 24-hour
//! repeat anchored to the first fire. At most one schedule is live: starting
//! a new one cancels every timer of the previous one first.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Generation-tagged timer fires so late fires of a replaced schedule are ignored
//! - 1.0.0: Initial release

use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, NaiveTime, TimeZone};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

use super::schedule::{compute_next_fire, REPEAT_PERIOD};
use super::timer::{TimerFire, TimerHandle, TimerKind, TimerProvider};
use crate::core::ScheduleError;

/// Timers belonging to the active schedule
#[derive(Debug, Default)]
pub struct ScheduleHandle {
    generation: u64,
    one_shot: Option<TimerHandle>,
    repeating: Option<TimerHandle>,
}

impl ScheduleHandle {
    pub fn is_armed(&self) -> bool {
        self.one_shot.is_some() || self.repeating.is_some()
    }
}

/// A freshly armed schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledReminder {
    /// Wall-clock time of day the reminder repeats at
    pub time: NaiveTime,
    /// Local wall-clock time of the first fire
    pub next_fire: NaiveDateTime,
    /// Real time until the first fire
    pub delay: Duration,
}

/// What the engine should do with a timer fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Run a reminder dispatch; `first` is true for the one-shot leg
    Dispatch { first: bool },
    /// Fire from a replaced or cancelled schedule
    Stale,
}

pub struct ReminderScheduler {
    timers: Arc<dyn TimerProvider>,
    handle: ScheduleHandle,
    reminder_time: Option<NaiveTime>,
    next_fire: Option<NaiveDateTime>,
}

impl ReminderScheduler {
    pub fn new(timers: Arc<dyn TimerProvider>) -> Self {
        Self {
            timers,
            handle: ScheduleHandle::default(),
            reminder_time: None,
            next_fire: None,
        }
    }

    /// Replace the active schedule with one firing daily at `time`.
    ///
    /// Validation happens before anything is cancelled, so a bad time leaves
    /// the previous schedule armed.
    pub fn start<Tz: TimeZone>(
        &mut self,
        time: &str,
        now: &DateTime<Tz>,
    ) -> Result<ScheduledReminder, ScheduleError> {
        if time.trim().is_empty() {
            return Err(ScheduleError::EmptyTime);
        }
        let fire_at = compute_next_fire(time, now)?;
        let delay = (fire_at.clone() - now.clone())
            .to_std()
            .unwrap_or(Duration::ZERO);
        let next_fire = fire_at.naive_local();
        let time = next_fire.time();

        self.cancel_all();

        let generation = self.handle.generation + 1;
        let one_shot = self.timers.after(
            delay,
            TimerFire {
                generation,
                kind: TimerKind::OneShot,
            },
        );
        self.handle = ScheduleHandle {
            generation,
            one_shot: Some(one_shot),
            repeating: None,
        };
        self.reminder_time = Some(time);
        self.next_fire = Some(next_fire);

        info!(
            "Reminder schedule #{generation} armed for {} (in {}s)",
            next_fire,
            delay.as_secs()
        );

        Ok(ScheduledReminder {
            time,
            next_fire,
            delay,
        })
    }

    /// Account for an elapsed timer
    pub fn on_fired<Tz: TimeZone>(&mut self, fire: TimerFire, now: &DateTime<Tz>) -> FireOutcome {
        if fire.generation != self.handle.generation {
            debug!(
                "Ignoring {:?} fire from schedule #{} (active #{})",
                fire.kind, fire.generation, self.handle.generation
            );
            return FireOutcome::Stale;
        }

        match fire.kind {
            TimerKind::OneShot => {
                if self.handle.one_shot.take().is_none() {
                    debug!("One-shot for schedule #{} already handled", fire.generation);
                    return FireOutcome::Stale;
                }
                let repeating = self.timers.every(
                    REPEAT_PERIOD,
                    TimerFire {
                        generation: fire.generation,
                        kind: TimerKind::Daily,
                    },
                );
                self.handle.repeating = Some(repeating);
                self.next_fire = Some((now.clone() + ChronoDuration::days(1)).naive_local());
                FireOutcome::Dispatch { first: true }
            }
            TimerKind::Daily => {
                if self.handle.repeating.is_none() {
                    return FireOutcome::Stale;
                }
                self.next_fire = Some((now.clone() + ChronoDuration::days(1)).naive_local());
                FireOutcome::Dispatch { first: false }
            }
        }
    }

    /// Cancel whichever timers are armed
    pub fn cancel_all(&mut self) {
        if let Some(handle) = self.handle.one_shot.take() {
            self.timers.cancel(handle);
        }
        if let Some(handle) = self.handle.repeating.take() {
            self.timers.cancel(handle);
        }
        self.next_fire = None;
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_armed()
    }

    pub fn reminder_time(&self) -> Option<NaiveTime> {
        self.reminder_time
    }

    pub fn next_fire(&self) -> Option<NaiveDateTime> {
        self.next_fire
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
