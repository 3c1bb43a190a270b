//! Error types for tocal-engine operations.

use thiserror::Error;

/// Error type returned by [`CalendarService`](crate::scheduler::CalendarService)
/// implementations. Passed through to the caller untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum TocalError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Failed to fetch busy intervals: {0}")]
    CalendarFetch(#[source] BoxError),

    #[error("Failed to create event: {0}")]
    CalendarInsert(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, TocalError>;
