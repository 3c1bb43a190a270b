//! # tocal-engine
//!
//! Deterministic first-fit scheduling of tasks into a calendar.
//!
//! Given a task length and a "not before N days from now" offset, the engine
//! computes the earliest start that fits between busy intervals, inside
//! office hours, on a weekday. The calendar provider is an injected
//! capability; the engine itself does no I/O.
//!
//! ## Modules
//!
//! - [`instant`] — Wall-clock helpers over `chrono::DateTime` (replace hour, add days, weekends)
//! - [`office_hours`] — Office-hours window and the policy moving instants into it
//! - [`seed`] — Initial search boundary from a day offset
//! - [`slot`] — Busy intervals and the greedy first-fit slot search
//! - [`scheduler`] — Seed → fetch → find → book orchestration over a [`CalendarService`]
//! - [`error`] — Error types

pub mod error;
pub mod instant;
pub mod office_hours;
pub mod scheduler;
pub mod seed;
pub mod slot;

pub use error::{BoxError, TocalError};
pub use instant::{now_in, parse_timezone, task_duration};
pub use office_hours::{advance_to_business_window, OfficeHours};
pub use scheduler::{
    Booking, CalendarService, EventScheduler, SchedulerConfig, TaskRequest, MAX_OFFSET_DAYS,
    MAX_OFFSET_DRIFT_DAYS,
};
pub use seed::seed_start;
pub use slot::{find_slot, validate_busy_intervals, BusyInterval};
