//! Seed → fetch → find → book orchestration.
//!
//! The calendar provider is reached only through [`CalendarService`], so the
//! whole flow runs against an in-memory stand-in in tests. The scheduler is
//! synchronous and keeps no state between runs apart from its configuration
//! and the service it owns.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::error::{BoxError, Result, TocalError};
use crate::instant::{add_days, task_duration};
use crate::office_hours::OfficeHours;
use crate::seed::seed_start;
use crate::slot::{find_slot, BusyInterval};

/// The two calendar operations the scheduler needs.
///
/// Instants cross this boundary in UTC; the scheduler converts them into the
/// search zone.
pub trait CalendarService {
    /// Busy time between `time_min` and `time_max`, sorted by start and
    /// already merged so that no two intervals overlap.
    fn fetch_busy_intervals(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> std::result::Result<Vec<BusyInterval<Utc>>, BoxError>;

    /// Create a single event.
    fn create_event(
        &mut self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> std::result::Result<(), BoxError>;
}

/// Largest day offset a request or the configuration may ask for.
pub const MAX_OFFSET_DAYS: u32 = 3650;

/// Largest busy-time fetch horizon, in days.
pub const MAX_OFFSET_DRIFT_DAYS: u32 = 366;

/// Scheduling policy and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub office_hours: OfficeHours,
    /// Task length when the request does not give one.
    pub default_duration_minutes: i64,
    /// Days from today the search starts at when the request does not say.
    pub default_offset_days: u32,
    /// How many days past the search start busy time is fetched for.
    pub max_offset_drift_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            office_hours: OfficeHours::default(),
            default_duration_minutes: 30,
            default_offset_days: 1,
            max_offset_drift_days: 7,
        }
    }
}

impl SchedulerConfig {
    /// # Errors
    ///
    /// Returns [`TocalError::InvalidConfig`] for a non-positive default
    /// duration, a default offset above [`MAX_OFFSET_DAYS`], or a fetch
    /// horizon outside `1..=MAX_OFFSET_DRIFT_DAYS`.
    pub fn validate(&self) -> Result<()> {
        if self.default_duration_minutes <= 0 {
            return Err(TocalError::InvalidConfig(format!(
                "default_duration_minutes must be positive, got {}",
                self.default_duration_minutes
            )));
        }
        if self.max_offset_drift_days == 0 {
            return Err(TocalError::InvalidConfig(
                "max_offset_drift_days must be at least 1".to_string(),
            ));
        }
        if self.max_offset_drift_days > MAX_OFFSET_DRIFT_DAYS {
            return Err(TocalError::InvalidConfig(format!(
                "max_offset_drift_days must be at most {MAX_OFFSET_DRIFT_DAYS}, got {}",
                self.max_offset_drift_days
            )));
        }
        if self.default_offset_days > MAX_OFFSET_DAYS {
            return Err(TocalError::InvalidConfig(format!(
                "default_offset_days must be at most {MAX_OFFSET_DAYS}, got {}",
                self.default_offset_days
            )));
        }
        Ok(())
    }
}

/// A task to place on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub summary: String,
    pub duration_minutes: Option<i64>,
    pub offset_days: Option<u32>,
}

impl TaskRequest {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            duration_minutes: None,
            offset_days: None,
        }
    }

    pub fn with_duration_minutes(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_offset_days(mut self, days: u32) -> Self {
        self.offset_days = Some(days);
        self
    }
}

/// Where a task was (or would be) placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking<T: TimeZone> {
    pub summary: String,
    pub start: DateTime<T>,
    pub end: DateTime<T>,
}

impl<T: TimeZone> Booking<T> {
    pub fn duration(&self) -> TimeDelta {
        self.end.naive_utc() - self.start.naive_utc()
    }
}

/// Books tasks into the first free slot of a calendar.
pub struct EventScheduler<C> {
    calendar: C,
    config: SchedulerConfig,
}

impl<C: CalendarService> EventScheduler<C> {
    /// # Errors
    ///
    /// Returns [`TocalError::InvalidConfig`] if `config` does not validate.
    pub fn new(calendar: C, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { calendar, config })
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    pub fn into_calendar(self) -> C {
        self.calendar
    }

    /// Find where `request` would go, without creating anything.
    ///
    /// The search starts at [`seed_start`] for the request's offset, busy
    /// time is fetched from there up to `max_offset_drift_days` later, and
    /// [`find_slot`] picks the start. The booking is expressed in `now`'s
    /// zone.
    ///
    /// # Errors
    ///
    /// - [`TocalError::InvalidInput`] for a blank summary, an offset above
    ///   [`MAX_OFFSET_DAYS`] or a malformed busy list
    /// - [`TocalError::InvalidDuration`] for a non-positive duration
    /// - [`TocalError::CalendarFetch`] when the provider query fails
    pub fn plan<T: TimeZone>(&self, request: &TaskRequest, now: &DateTime<T>) -> Result<Booking<T>> {
        let summary = request.summary.trim();
        if summary.is_empty() {
            return Err(TocalError::InvalidInput("task summary is empty".to_string()));
        }
        let duration = task_duration(
            request
                .duration_minutes
                .unwrap_or(self.config.default_duration_minutes),
        )?;
        let offset_days = request
            .offset_days
            .unwrap_or(self.config.default_offset_days);
        if offset_days > MAX_OFFSET_DAYS {
            return Err(TocalError::InvalidInput(format!(
                "offset of {offset_days} days is more than {MAX_OFFSET_DAYS}"
            )));
        }
        let window = &self.config.office_hours;
        let tz = now.timezone();

        let seed = seed_start(offset_days, window, now)?;
        let horizon = add_days(&seed, self.config.max_offset_drift_days)?;
        tracing::debug!(?seed, ?horizon, "fetching busy intervals");

        let busy: Vec<BusyInterval<T>> = self
            .calendar
            .fetch_busy_intervals(seed.with_timezone(&Utc), horizon.with_timezone(&Utc))
            .map_err(TocalError::CalendarFetch)?
            .iter()
            .map(|interval| interval.with_timezone(&tz))
            .collect();
        tracing::debug!(intervals = busy.len(), "busy intervals fetched");

        let start = find_slot(seed, duration, &busy, window)?;
        let end = start.clone() + duration;
        Ok(Booking {
            summary: summary.to_string(),
            start,
            end,
        })
    }

    /// [`plan`](Self::plan) the request and create the event.
    ///
    /// Either exactly one event is created or, on any error, none.
    ///
    /// # Errors
    ///
    /// Everything [`plan`](Self::plan) returns, plus
    /// [`TocalError::CalendarInsert`] when the provider rejects the event.
    pub fn schedule<T: TimeZone>(
        &mut self,
        request: &TaskRequest,
        now: &DateTime<T>,
    ) -> Result<Booking<T>> {
        let booking = self.plan(request, now)?;
        self.calendar
            .create_event(
                &booking.summary,
                booking.start.with_timezone(&Utc),
                booking.end.with_timezone(&Utc),
            )
            .map_err(TocalError::CalendarInsert)?;
        tracing::debug!(start = ?booking.start, "event created");
        Ok(booking)
    }
}
