//! Wall-clock reminder time arithmetic

use chrono::{
    DateTime, Duration as ChronoDuration, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeZone,
};
use std::time::Duration;

use crate::core::ScheduleError;

/// Period of the repeating reminder once the first one has fired
pub const REPEAT_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Parse an `HH:MM` time of day.
///
/// Both parts must be present and purely numeric, and form a valid 24-hour
/// clock time. Anything else is reported, never defaulted.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let raw = raw.trim();
    let invalid = || ScheduleError::InvalidTimeFormat(raw.to_string());

    let (hours, minutes) = raw.split_once(':').ok_or_else(invalid)?;
    let hours = parse_component(hours).ok_or_else(invalid)?;
    let minutes = parse_component(minutes).ok_or_else(invalid)?;

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Next instant at `time`: today if still ahead of `now`, otherwise tomorrow.
///
/// The wall-clock target is resolved in `now`'s time zone, so the result is an
/// absolute instant even across daylight-saving changes.
pub fn next_fire_after<Tz: TimeZone>(time: NaiveTime, now: &DateTime<Tz>) -> DateTime<Tz> {
    let wall_now = now.naive_local();
    let mut wall = wall_now.date().and_time(time);
    if wall <= wall_now {
        wall = wall + ChronoDuration::days(1);
    }
    resolve_wall_clock(&now.timezone(), wall)
}

/// Map a local wall-clock time onto an instant in `tz`
pub fn resolve_wall_clock<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(instant) => instant,
        // Clocks went back: the first occurrence
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Clocks went forward over `wall`: apply the offset in force before the jump
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(wall - ChronoDuration::days(1)))
                .fix();
            let utc = wall - ChronoDuration::seconds(i64::from(before.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Parse `raw` and compute its next fire instant relative to `now`
pub fn compute_next_fire<Tz: TimeZone>(
    raw: &str,
    now: &DateTime<Tz>,
) -> Result<DateTime<Tz>, ScheduleError> {
    let time = parse_time_of_day(raw)?;
    Ok(next_fire_after(time, now))
}

/// Human-readable clock time used in spoken and status messages
pub fn format_clock(wall: NaiveDateTime) -> String {
    wall.format("%H:%M").to_string()
}

/// Whole minutes in `delay`, rounded to nearest
pub fn whole_minutes(delay: Duration) -> u64 {
    (delay.as_secs() + 30) / 60
}
