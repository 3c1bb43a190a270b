//! Timezone-aware instant and duration primitives.
//!
//! A "time instant" is a plain [`chrono::DateTime<T>`] for any `T: TimeZone`,
//! and a duration is a [`chrono::TimeDelta`]. This module adds the handful of
//! wall-clock operations the slot search needs on top of chrono: replacing
//! the hour of day, stepping whole calendar days, and weekday checks. All of
//! them operate on the *local* date and time of the instant's own zone.
//!
//! Only [`now_in`] reads the system clock. Everything else is pure.
//!
//! # Local time resolution
//!
//! Wall-clock values that do not exist in a zone (spring-forward DST gaps)
//! resolve to the first valid local time after the gap, on a 15-minute step.
//! Ambiguous values (fall-back overlaps) resolve to the earlier instant.

use chrono::{
    DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;

use crate::error::TocalError;

/// The current instant, expressed in `tz`.
pub fn now_in<T: TimeZone>(tz: &T) -> DateTime<T> {
    Utc::now().with_timezone(tz)
}

/// The same local date as `t`, at `hour:00:00`.
pub fn at_hour<T: TimeZone>(t: &DateTime<T>, hour: u32) -> DateTime<T> {
    at_hour_on(t.date_naive(), hour, &t.timezone())
}

/// `hour:00:00` on the local calendar date `date` in `tz`.
pub fn at_hour_on<T: TimeZone>(date: NaiveDate, hour: u32, tz: &T) -> DateTime<T> {
    let naive = date.and_time(NaiveTime::default()) + TimeDelta::hours(i64::from(hour));
    resolve_local(tz, naive)
}

/// `hour:00:00` on the local calendar day after `t`.
pub fn next_day_at_hour<T: TimeZone>(t: &DateTime<T>, hour: u32) -> DateTime<T> {
    at_hour_on(t.date_naive() + Days::new(1), hour, &t.timezone())
}

/// The same local wall-clock time `days` calendar days later.
///
/// Across a DST transition this is not `days * 24h`: 10:00 stays 10:00.
///
/// # Errors
///
/// Returns [`TocalError::InvalidInput`] when the resulting date is outside
/// the range chrono can represent.
pub fn add_days<T: TimeZone>(t: &DateTime<T>, days: u32) -> Result<DateTime<T>, TocalError> {
    let date = t
        .date_naive()
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| {
            TocalError::InvalidInput(format!("{} plus {days} days is out of range", t.date_naive()))
        })?;
    Ok(resolve_local(&t.timezone(), date.and_time(t.time())))
}

/// Elapsed time from `from` to `to`. Negative when `to` is earlier.
pub fn duration_between<T: TimeZone>(from: &DateTime<T>, to: &DateTime<T>) -> TimeDelta {
    to.naive_utc() - from.naive_utc()
}

/// Whether `t` falls on a Saturday or Sunday in its own zone.
pub fn is_weekend<T: TimeZone>(t: &DateTime<T>) -> bool {
    matches!(t.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Build a task duration from whole minutes.
///
/// # Errors
///
/// Returns [`TocalError::InvalidDuration`] when `minutes` is zero or negative,
/// or too large to represent.
pub fn task_duration(minutes: i64) -> Result<TimeDelta, TocalError> {
    if minutes <= 0 {
        return Err(TocalError::InvalidDuration(format!(
            "task duration must be positive, got {minutes} minutes"
        )));
    }
    TimeDelta::try_minutes(minutes)
        .ok_or_else(|| TocalError::InvalidDuration(format!("{minutes} minutes is out of range")))
}

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz, TocalError> {
    s.parse::<Tz>()
        .map_err(|_| TocalError::InvalidTimezone(format!("'{}'", s)))
}

fn resolve_local<T: TimeZone>(tz: &T, naive: NaiveDateTime) -> DateTime<T> {
    let mut candidate = naive;
    loop {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt;
        }
        candidate += TimeDelta::minutes(15);
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
