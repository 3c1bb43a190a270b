//! Command-line surface and the single run it performs.

use std::fmt::Display;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, TimeZone};
use clap::Parser;
use tocal_engine::{now_in, parse_timezone, CalendarService, EventScheduler, TaskRequest};

use crate::auth;
use crate::config::Config;
use crate::google::GoogleCalendar;
use crate::output::{human_line, json_line};
use crate::task::parse_task_args;

/// Send your tasks directly to the calendar rather than a todo list.
///
/// `@N` sets the task length in minutes, `+N` how many days from today the
/// search starts. All other words form the event summary.
#[derive(Debug, Parser)]
#[command(name = "tocal", author, version, about)]
pub struct Cli {
    /// Task words, e.g. `+3 @15 Check something really quick`
    #[arg(required = true, value_name = "TASK")]
    pub task: Vec<String>,

    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// IANA timezone to search in (default: config, then the system zone)
    #[arg(long, value_name = "IANA")]
    pub timezone: Option<String>,

    /// Calendar to query and book into
    #[arg(long, value_name = "ID")]
    pub calendar_id: Option<String>,

    /// Find the slot but do not create the event
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the booking as JSON
    #[arg(long)]
    pub json: bool,

    /// Ask for calendar access again even if a token is stored
    #[arg(long)]
    pub reauth: bool,

    /// Pretend the current time is this RFC 3339 instant
    #[arg(long, hide = true, value_name = "RFC3339")]
    pub now: Option<DateTime<FixedOffset>>,
}

/// Run one invocation: resolve config, authorize, find the slot, book it.
pub fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(calendar_id) = &cli.calendar_id {
        config.calendar_id = calendar_id.clone();
    }
    if let Some(timezone) = &cli.timezone {
        config.timezone = Some(timezone.clone());
    }

    let scheduler_config = config.scheduler_config()?;
    let zone = config.timezone.as_deref().map(parse_timezone).transpose()?;
    let request = parse_task_args(&cli.task)?;

    let access_token = auth::access_token(&config, cli.reauth)?;
    let calendar = GoogleCalendar::new(&config.google.api_base_url, &config.calendar_id, access_token)
        .context("Failed to build HTTP client")?;
    let mut scheduler = EventScheduler::new(calendar, scheduler_config)?;

    let line = match zone {
        Some(tz) => book(&mut scheduler, &request, current_time(&tz, cli.now), &cli)?,
        None => book(&mut scheduler, &request, current_time(&Local, cli.now), &cli)?,
    };
    println!("{line}");
    Ok(())
}

fn current_time<T: TimeZone>(tz: &T, fixed: Option<DateTime<FixedOffset>>) -> DateTime<T> {
    match fixed {
        Some(now) => now.with_timezone(tz),
        None => now_in(tz),
    }
}

fn book<C, T>(
    scheduler: &mut EventScheduler<C>,
    request: &TaskRequest,
    now: DateTime<T>,
    cli: &Cli,
) -> Result<String>
where
    C: CalendarService,
    T: TimeZone,
    T::Offset: Display,
{
    tracing::debug!(%now, dry_run = cli.dry_run, "searching for a slot");
    let booking = if cli.dry_run {
        scheduler.plan(request, &now)?
    } else {
        scheduler.schedule(request, &now)?
    };
    let created = !cli.dry_run;

    if cli.json {
        Ok(json_line(&booking, created)?)
    } else {
        Ok(human_line(&booking, created))
    }
}
