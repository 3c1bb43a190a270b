//! First-fit free slot search over an ordered list of busy intervals.
//!
//! The search is a single greedy left-to-right pass. A cursor starts at the
//! search start, moved to where the task fits inside office hours on a
//! weekday. Each busy interval either leaves a gap in front of it that is
//! long enough for the task, ending the search, or pushes the cursor to its
//! end, after which the cursor is fitted into office hours again. If no
//! interval leaves a big enough gap, the cursor after the last interval is
//! the answer.
//!
//! The busy list must be sorted by start and free of overlaps. That is
//! what a free/busy query returns, and [`find_slot`] checks it up front
//! instead of silently mis-scheduling.

use chrono::{DateTime, TimeDelta, TimeZone};

use crate::error::TocalError;
use crate::instant::duration_between;
use crate::office_hours::{fit_within_day, OfficeHours};

/// A range of time already taken on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyInterval<T: TimeZone> {
    pub start: DateTime<T>,
    pub end: DateTime<T>,
}

impl<T: TimeZone> BusyInterval<T> {
    /// # Errors
    ///
    /// Returns [`TocalError::InvalidInput`] if `end` is before `start`.
    pub fn new(start: DateTime<T>, end: DateTime<T>) -> Result<Self, TocalError> {
        if end < start {
            return Err(TocalError::InvalidInput(
                "busy interval ends before it starts".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// The same interval expressed in another zone.
    pub fn with_timezone<U: TimeZone>(&self, tz: &U) -> BusyInterval<U> {
        BusyInterval {
            start: self.start.with_timezone(tz),
            end: self.end.with_timezone(tz),
        }
    }

    /// Whether the half-open range `[start, end)` shares any time with this
    /// interval. Touching ranges do not overlap.
    pub fn overlaps(&self, start: &DateTime<T>, end: &DateTime<T>) -> bool {
        *start < self.end && self.start < *end
    }
}

/// Check that `busy` is usable by [`find_slot`].
///
/// # Errors
///
/// Returns [`TocalError::InvalidInput`] naming the first offending interval
/// if one ends before it starts, starts before its predecessor, or overlaps
/// its predecessor. Adjacent intervals are accepted.
pub fn validate_busy_intervals<T: TimeZone>(busy: &[BusyInterval<T>]) -> Result<(), TocalError> {
    for (i, interval) in busy.iter().enumerate() {
        if interval.end < interval.start {
            return Err(TocalError::InvalidInput(format!(
                "busy interval {i} ends before it starts"
            )));
        }
    }
    for (i, pair) in busy.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start < prev.start {
            return Err(TocalError::InvalidInput(format!(
                "busy intervals are not sorted by start at index {}",
                i + 1
            )));
        }
        if next.start < prev.end {
            return Err(TocalError::InvalidInput(format!(
                "busy interval {} overlaps the one before it",
                i + 1
            )));
        }
    }
    Ok(())
}

/// Find the earliest start for a task of length `duration`.
///
/// # Arguments
///
/// * `start` — Lower bound of the search; its zone is the search zone
/// * `duration` — Task length, at least one minute
/// * `busy` — Busy intervals sorted by start, non-overlapping
/// * `window` — Office hours
///
/// # Algorithm
///
/// 1. The cursor starts at `start` moved by [`fit_within_day`]: past any
///    weekend, into office hours, and to the next morning if the task would
///    run past `end_hour`.
/// 2. For each busy interval, if the time from the cursor to the interval's
///    start is at least `duration` (an exact fit counts), the cursor is
///    returned.
/// 3. Otherwise the cursor moves to the interval's end (never backwards) and
///    is fitted again. A Friday evening end rolls straight to Monday.
/// 4. With no fitting gap, the final cursor is returned. It may lie past the
///    range the busy intervals were fetched for.
///
/// `[result, result + duration)` is always on a single weekday inside
/// `window` and overlaps none of `busy`.
///
/// # Errors
///
/// Returns [`TocalError::InvalidDuration`] for durations under a minute or
/// longer than the office day, and [`TocalError::InvalidInput`] if `busy`
/// fails [`validate_busy_intervals`].
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use tocal_engine::office_hours::OfficeHours;
/// use tocal_engine::slot::{find_slot, BusyInterval};
///
/// let at = |h, m| Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap();
/// let busy = vec![BusyInterval::new(at(9, 0), at(9, 30)).unwrap()];
///
/// let slot = find_slot(at(9, 0), TimeDelta::minutes(60), &busy, &OfficeHours::default()).unwrap();
/// assert_eq!(slot, at(9, 30));
/// ```
pub fn find_slot<T: TimeZone>(
    start: DateTime<T>,
    duration: TimeDelta,
    busy: &[BusyInterval<T>],
    window: &OfficeHours,
) -> Result<DateTime<T>, TocalError> {
    if duration < TimeDelta::minutes(1) {
        return Err(TocalError::InvalidDuration(format!(
            "task duration must be at least one minute, got {} seconds",
            duration.num_seconds()
        )));
    }
    if duration > window.length() {
        return Err(TocalError::InvalidDuration(format!(
            "a {} minute task does not fit in {} hours of office time",
            duration.num_minutes(),
            window.length().num_hours()
        )));
    }
    validate_busy_intervals(busy)?;

    let tz = start.timezone();
    let mut current = fit_within_day(start, duration, window);
    tracing::debug!(?current, intervals = busy.len(), "scanning busy intervals");

    for interval in busy {
        let gap = duration_between(&current, &interval.start);
        if gap >= duration {
            tracing::debug!(slot = ?current, gap_minutes = gap.num_minutes(), "found gap");
            return Ok(current);
        }

        if interval.end > current {
            let end = interval.end.with_timezone(&tz);
            current = fit_within_day(end, duration, window);
        }
        tracing::trace!(?current, "busy interval blocks");
    }

    tracing::debug!(slot = ?current, "no gap before last busy interval");
    Ok(current)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn busy(d: u32, sh: u32, sm: u32, eh: u32, em: u32) -> BusyInterval<Utc> {
        BusyInterval::new(at(d, sh, sm), at(d, eh, em)).unwrap()
    }

    #[test]
    fn test_busy_interval_new_rejects_reversed() {
        assert!(BusyInterval::new(at(16, 10, 0), at(16, 9, 0)).is_err());
        assert!(BusyInterval::new(at(16, 10, 0), at(16, 10, 0)).is_ok());
    }

    #[test]
    fn test_busy_interval_overlaps_is_half_open() {
        let b = busy(16, 10, 0, 11, 0);
        assert!(b.overlaps(&at(16, 10, 30), &at(16, 12, 0)));
        assert!(!b.overlaps(&at(16, 11, 0), &at(16, 12, 0)));
        assert!(!b.overlaps(&at(16, 9, 0), &at(16, 10, 0)));
    }

    #[test]
    fn test_validate_accepts_adjacent() {
        let list = vec![busy(16, 9, 0, 10, 0), busy(16, 10, 0, 11, 0)];
        assert!(validate_busy_intervals(&list).is_ok());
    }

    #[test]
    fn test_validate_rejects_unsorted() {
        let list = vec![busy(16, 12, 0, 13, 0), busy(16, 9, 0, 10, 0)];
        let err = validate_busy_intervals(&list).unwrap_err().to_string();
        assert!(err.contains("not sorted"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let list = vec![busy(16, 9, 0, 10, 30), busy(16, 10, 0, 11, 0)];
        let err = validate_busy_intervals(&list).unwrap_err().to_string();
        assert!(err.contains("overlaps"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_reversed_interval() {
        let list = vec![BusyInterval {
            start: at(16, 10, 0),
            end: at(16, 9, 0),
        }];
        assert!(validate_busy_intervals(&list).is_err());
    }

    #[test]
    fn test_sub_minute_duration_rejected() {
        let window = OfficeHours::default();
        let result = find_slot(at(16, 9, 0), TimeDelta::seconds(30), &[], &window);
        assert!(matches!(result, Err(TocalError::InvalidDuration(_))));
    }

    #[test]
    fn test_interval_behind_cursor_does_not_move_it_back() {
        // Seed at 09:00 Monday, a stale interval from Sunday sits in the list.
        let window = OfficeHours::default();
        let list = vec![busy(15, 20, 0, 21, 0), busy(16, 9, 0, 9, 15)];
        let slot = find_slot(at(16, 9, 0), TimeDelta::minutes(30), &list, &window).unwrap();
        assert_eq!(slot, at(16, 9, 15));
    }

    #[test]
    fn test_friday_evening_rollover_skips_weekend_immediately() {
        // Busy until 17:30 on Friday with nothing after: Monday, not Saturday.
        let window = OfficeHours::default();
        let list = vec![busy(13, 9, 0, 17, 30)];
        let slot = find_slot(at(13, 9, 0), TimeDelta::minutes(30), &list, &window).unwrap();
        assert_eq!(slot, at(16, 9, 0));
    }

    #[test]
    fn test_interval_ending_before_office_hours_snaps_to_start() {
        let window = OfficeHours::default();
        let list = vec![BusyInterval::new(at(16, 16, 30), at(17, 7, 0)).unwrap()];
        let slot = find_slot(at(16, 16, 0), TimeDelta::minutes(45), &list, &window).unwrap();
        assert_eq!(slot, at(17, 9, 0));
    }

    #[test]
    fn test_overnight_gap_does_not_count() {
        // 16:45 to tomorrow's 09:00 meeting is long, but the task would run
        // past 17:00 and then collide with the meeting.
        let window = OfficeHours::default();
        let list = vec![busy(16, 9, 0, 16, 45), busy(17, 9, 0, 10, 0)];
        let slot = find_slot(at(16, 9, 0), TimeDelta::minutes(60), &list, &window).unwrap();
        assert_eq!(slot, at(17, 10, 0));
    }

    #[test]
    fn test_task_longer_than_office_day_rejected() {
        let window = OfficeHours::default();
        let result = find_slot(at(16, 9, 0), TimeDelta::hours(9), &[], &window);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("does not fit"), "got: {err}");
    }
}
