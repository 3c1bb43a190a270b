//! Google Calendar v3 client: free/busy query and event insert.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tocal_engine::{BoxError, BusyInterval, CalendarService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("calendar {0} is missing from the free/busy response")]
    MissingCalendar(String),

    #[error("free/busy query for calendar {calendar} failed: {reasons}")]
    FreeBusy { calendar: String, reasons: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyRequest<'a> {
    time_min: String,
    time_max: String,
    items: Vec<CalendarItem<'a>>,
}

#[derive(Debug, Serialize)]
struct CalendarItem<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<TimePeriod>,
    #[serde(default)]
    errors: Vec<FreeBusyError>,
}

#[derive(Debug, Deserialize)]
struct TimePeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyError {
    #[serde(default)]
    domain: String,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Serialize)]
struct EventRequest<'a> {
    summary: &'a str,
    start: EventDateTime,
    end: EventDateTime,
}

#[derive(Debug, Serialize)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: Option<String>,
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
}

/// RFC 3339 in UTC with a `Z` suffix, as the API expects.
fn to_gdate(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Sort by start and merge overlapping periods. Google already returns
/// merged busy time for a single calendar; this keeps the scheduler's
/// ordering contract regardless.
fn merge_busy(mut busy: Vec<BusyInterval<Utc>>) -> Vec<BusyInterval<Utc>> {
    busy.sort_by_key(|interval| interval.start);
    let mut merged: Vec<BusyInterval<Utc>> = Vec::with_capacity(busy.len());
    for interval in busy {
        if let Some(last) = merged.last_mut() {
            if interval.start < last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }
    merged
}

/// A single Google calendar reached with a bearer access token.
pub struct GoogleCalendar {
    client: Client,
    base_url: String,
    calendar_id: String,
    access_token: String,
}

impl GoogleCalendar {
    pub fn new(
        base_url: &str,
        calendar_id: &str,
        access_token: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            access_token: access_token.into(),
        })
    }
}

impl CalendarService for GoogleCalendar {
    fn fetch_busy_intervals(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval<Utc>>, BoxError> {
        let url = format!("{}/calendar/v3/freeBusy", self.base_url);
        let body = FreeBusyRequest {
            time_min: to_gdate(time_min),
            time_max: to_gdate(time_max),
            items: vec![CalendarItem {
                id: &self.calendar_id,
            }],
        };
        tracing::info!(
            calendar = %self.calendar_id,
            time_min = %body.time_min,
            time_max = %body.time_max,
            "querying free/busy"
        );

        let mut response: FreeBusyResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let calendar = response
            .calendars
            .remove(&self.calendar_id)
            .ok_or_else(|| GoogleError::MissingCalendar(self.calendar_id.clone()))?;
        if !calendar.errors.is_empty() {
            let reasons = calendar
                .errors
                .iter()
                .map(|e| format!("{}/{}", e.domain, e.reason))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(GoogleError::FreeBusy {
                calendar: self.calendar_id.clone(),
                reasons,
            }
            .into());
        }

        let busy = calendar
            .busy
            .into_iter()
            .map(|period| BusyInterval::new(period.start, period.end))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = busy.len(), "busy periods received");
        Ok(merge_busy(busy))
    }

    fn create_event(
        &mut self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), BoxError> {
        let url = format!(
            "{}/calendar/v3/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        );
        let body = EventRequest {
            summary,
            start: EventDateTime {
                date_time: to_gdate(start),
            },
            end: EventDateTime {
                date_time: to_gdate(end),
            },
        };

        let created: CreatedEvent = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        tracing::info!(
            id = created.id.as_deref().unwrap_or("-"),
            link = created.html_link.as_deref().unwrap_or("-"),
            "event created"
        );
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
