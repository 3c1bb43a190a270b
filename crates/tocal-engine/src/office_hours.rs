//! Office-hours window and the policy that moves an instant into it.
//!
//! The window is a daily local-time range `[start_hour, end_hour)` that only
//! applies Monday through Friday. [`advance_to_business_window`] is composed
//! of two independently usable steps:
//!
//! - [`skip_weekend`] — roll a Saturday/Sunday instant forward to the next
//!   weekday at `start_hour`
//! - [`clamp_to_hours`] — snap an instant before the window to `start_hour`
//!   the same day, and one at or after `end_hour` to `start_hour` the next day
//!
//! [`fit_within_day`] builds on both to find where a task of a given length
//! can start without running past `end_hour`.

use chrono::{DateTime, TimeDelta, TimeZone, Timelike};

use crate::error::TocalError;
use crate::instant::{at_hour, duration_between, is_weekend, next_day_at_hour};

/// Daily office hours, in local hours of day.
///
/// Invariant: `0 <= start_hour < end_hour <= 24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeHours {
    start_hour: u32,
    end_hour: u32,
}

impl OfficeHours {
    /// Create a window from `start_hour` (inclusive) to `end_hour` (exclusive).
    ///
    /// # Errors
    ///
    /// Returns [`TocalError::InvalidConfig`] unless `start_hour < end_hour <= 24`.
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, TocalError> {
        if end_hour > 24 {
            return Err(TocalError::InvalidConfig(format!(
                "office hours end {end_hour} is past 24"
            )));
        }
        if start_hour >= end_hour {
            return Err(TocalError::InvalidConfig(format!(
                "office hours start {start_hour} must be before end {end_hour}"
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    /// Nominal length of one office day.
    pub fn length(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.end_hour - self.start_hour))
    }

    /// Whether `t` is on a weekday and its local hour is inside the window.
    pub fn contains<T: TimeZone>(&self, t: &DateTime<T>) -> bool {
        let hour = t.hour();
        !is_weekend(t) && hour >= self.start_hour && hour < self.end_hour
    }
}

impl Default for OfficeHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
        }
    }
}

/// Roll `t` forward until it is on a weekday.
///
/// Each step lands on `start_hour` of the following day, so any finer
/// time-of-day of the input `t` is discarded. A weekday `t` is returned
/// unchanged.
pub fn skip_weekend<T: TimeZone>(t: DateTime<T>, window: &OfficeHours) -> DateTime<T> {
    let mut t = t;
    while is_weekend(&t) {
        t = next_day_at_hour(&t, window.start_hour);
    }
    t
}

/// Snap `t` into the daily window without looking at the weekday.
pub fn clamp_to_hours<T: TimeZone>(t: DateTime<T>, window: &OfficeHours) -> DateTime<T> {
    let hour = t.hour();
    if hour < window.start_hour {
        at_hour(&t, window.start_hour)
    } else if hour >= window.end_hour {
        next_day_at_hour(&t, window.start_hour)
    } else {
        t
    }
}

/// Move `t` to the earliest instant `>= t` inside office hours.
///
/// Applies [`skip_weekend`] and then [`clamp_to_hours`]. The end-of-day
/// rollover in the second step does **not** re-check the weekend: a Friday
/// evening instant comes back as Saturday at `start_hour`. Callers that need
/// a weekday must apply [`skip_weekend`] again afterwards.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tocal_engine::office_hours::{advance_to_business_window, OfficeHours};
///
/// let window = OfficeHours::new(9, 17).unwrap();
/// // Saturday afternoon rolls to Monday morning.
/// let saturday = Utc.with_ymd_and_hms(2026, 3, 14, 15, 30, 0).unwrap();
/// let t = advance_to_business_window(saturday, &window);
/// assert_eq!(t, Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap());
/// ```
pub fn advance_to_business_window<T: TimeZone>(
    t: DateTime<T>,
    window: &OfficeHours,
) -> DateTime<T> {
    clamp_to_hours(skip_weekend(t, window), window)
}

/// Move `t` to the earliest instant `>= t` on a weekday from which a task of
/// length `duration` ends no later than `end_hour` the same day.
///
/// `duration` must not exceed [`OfficeHours::length`]; the slot finder checks
/// this before calling.
pub fn fit_within_day<T: TimeZone>(
    t: DateTime<T>,
    duration: TimeDelta,
    window: &OfficeHours,
) -> DateTime<T> {
    let mut t = skip_weekend(advance_to_business_window(t, window), window);
    loop {
        let day_end = at_hour(&t, window.end_hour);
        if duration_between(&t, &day_end) >= duration {
            return t;
        }
        t = skip_weekend(next_day_at_hour(&t, window.start_hour), window);
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
