//! Initial search boundary for a task.

use chrono::{DateTime, TimeZone};

use crate::error::TocalError;
use crate::instant::{add_days, at_hour};
use crate::office_hours::OfficeHours;

/// Where the slot search starts: `now`'s local date at office-hours start,
/// moved `offset_days` calendar days ahead.
///
/// No weekend adjustment happens here; the slot finder normalizes the seed
/// on its first step. The seed is also the lower bound of the busy-interval
/// fetch.
///
/// # Errors
///
/// Returns [`TocalError::InvalidInput`] when the offset moves the date out of
/// chrono's range.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tocal_engine::office_hours::OfficeHours;
/// use tocal_engine::seed::seed_start;
///
/// let now = Utc.with_ymd_and_hms(2026, 3, 16, 14, 37, 0).unwrap();
/// let seed = seed_start(1, &OfficeHours::default(), &now).unwrap();
/// assert_eq!(seed, Utc.with_ymd_and_hms(2026, 3, 17, 9, 0, 0).unwrap());
/// ```
pub fn seed_start<T: TimeZone>(
    offset_days: u32,
    window: &OfficeHours,
    now: &DateTime<T>,
) -> Result<DateTime<T>, TocalError> {
    add_days(&at_hour(now, window.start_hour()), offset_days)
}
