//! Rendering a booking for the terminal.

use std::fmt::Display;

use chrono::{SecondsFormat, TimeZone};
use serde::Serialize;
use tocal_engine::Booking;

#[derive(Debug, Serialize)]
pub struct BookingJson {
    pub summary: String,
    pub start: String,
    pub end: String,
    pub duration_minutes: i64,
    pub created: bool,
}

impl<T: TimeZone> From<(&Booking<T>, bool)> for BookingJson
where
    T::Offset: Display,
{
    fn from((booking, created): (&Booking<T>, bool)) -> Self {
        Self {
            summary: booking.summary.clone(),
            start: booking.start.to_rfc3339_opts(SecondsFormat::Secs, false),
            end: booking.end.to_rfc3339_opts(SecondsFormat::Secs, false),
            duration_minutes: booking.duration().num_minutes(),
            created,
        }
    }
}

/// One line, e.g. `Scheduled "Read" on Tue 2026-03-17 09:00–09:30`.
pub fn human_line<T: TimeZone>(booking: &Booking<T>, created: bool) -> String
where
    T::Offset: Display,
{
    let verb = if created { "Scheduled" } else { "Would schedule" };
    format!(
        "{verb} \"{}\" on {} {}–{}",
        booking.summary,
        booking.start.format("%a %Y-%m-%d"),
        booking.start.format("%H:%M"),
        booking.end.format("%H:%M"),
    )
}

pub fn json_line<T: TimeZone>(booking: &Booking<T>, created: bool) -> serde_json::Result<String>
where
    T::Offset: Display,
{
    serde_json::to_string(&BookingJson::from((booking, created)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::Tz;

    fn booking<T: TimeZone>(tz: &T) -> Booking<T> {
        Booking {
            summary: "Read http://this.link".to_string(),
            start: tz.with_ymd_and_hms(2026, 3, 17, 9, 0, 0).unwrap(),
            end: tz.with_ymd_and_hms(2026, 3, 17, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_human_line() {
        let line = human_line(&booking(&Utc), true);
        assert_eq!(line, "Scheduled \"Read http://this.link\" on Tue 2026-03-17 09:00–09:30");
    }

    #[test]
    fn test_human_line_dry_run() {
        let line = human_line(&booking(&Utc), false);
        assert!(line.starts_with("Would schedule \"Read http://this.link\""));
    }

    #[test]
    fn test_json_uses_search_zone_offset() {
        let prague: Tz = "Europe/Prague".parse().unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&json_line(&booking(&prague), false).unwrap()).unwrap();

        assert_eq!(value["summary"], "Read http://this.link");
        assert_eq!(value["start"], "2026-03-17T09:00:00+01:00");
        assert_eq!(value["end"], "2026-03-17T09:30:00+01:00");
        assert_eq!(value["duration_minutes"], 30);
        assert_eq!(value["created"], false);
    }
}
