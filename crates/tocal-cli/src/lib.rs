//! # tocal
//!
//! Send a task straight to the first free slot of your calendar instead of
//! a todo list.
//!
//! ```text
//! tocal Read http://this.link                 # 30 minutes, first free slot from tomorrow
//! tocal +3 @15 Check something really quick   # 15 minutes, not before three days from now
//! ```
//!
//! ## Modules
//!
//! - [`cli`] — Argument parsing and the run loop
//! - [`task`] — `@N` / `+N` task tokens
//! - [`config`] — TOML configuration file
//! - [`auth`] — OAuth access token for the Calendar API
//! - [`google`] — Google Calendar free/busy and event insert
//! - [`output`] — Human and JSON rendering of a booking

pub mod auth;
pub mod cli;
pub mod config;
pub mod google;
pub mod output;
pub mod task;

pub use cli::{run, Cli};
pub use config::Config;
