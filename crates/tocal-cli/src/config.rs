//! TOML configuration.
//!
//! The file is looked up as `--config`, then `$TOCAL_CONFIG`, then
//! `<config dir>/tocal/config.toml`. Every key is optional; a missing default
//! file is the same as an empty one.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;
use tocal_engine::{OfficeHours, SchedulerConfig, TocalError};

pub const APP_NAME: &str = "tocal";
pub const TOCAL_CONFIG_ENV: &str = "TOCAL_CONFIG";

const CONFIG_FILE: &str = "config.toml";
const TOKEN_FILE: &str = "token.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub office_hours_start: u32,
    pub office_hours_end: u32,
    pub default_duration_minutes: i64,
    pub default_offset_days: u32,
    pub max_offset_drift_days: u32,
    /// IANA zone to search in. The system zone when unset.
    pub timezone: Option<String>,
    pub calendar_id: String,
    /// Where the OAuth refresh token is kept.
    pub token_path: Option<PathBuf>,
    pub google: GoogleConfig,
}

impl Default for Config {
    fn default() -> Self {
        let engine = SchedulerConfig::default();
        Self {
            office_hours_start: engine.office_hours.start_hour(),
            office_hours_end: engine.office_hours.end_hour(),
            default_duration_minutes: engine.default_duration_minutes,
            default_offset_days: engine.default_offset_days,
            max_offset_drift_days: engine.max_offset_drift_days,
            timezone: None,
            calendar_id: "primary".to_string(),
            token_path: None,
            google: GoogleConfig::default(),
        }
    }
}

/// Google API endpoints and OAuth client credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: String,
    pub token_url: String,
    pub auth_url: String,
    pub redirect_uri: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: "https://www.googleapis.com".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
        }
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    /// Resolve and read the configuration file.
    ///
    /// An explicitly named file (flag or environment) must exist; the
    /// default location may be absent.
    #[tracing::instrument]
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(TOCAL_CONFIG_ENV);
        let Some((path, required)) = resolve_config_path(explicit, env_path, default_config_path())
        else {
            tracing::debug!("no config directory, using defaults");
            return Ok(Self::default());
        };

        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(path = %path.display(), "reading config");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        content
            .parse::<Self>()
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    /// The engine's view of this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TocalError::InvalidConfig`] for an invalid office-hours
    /// window, a non-positive default duration, or an offset or drift out
    /// of range.
    pub fn scheduler_config(&self) -> std::result::Result<SchedulerConfig, TocalError> {
        let config = SchedulerConfig {
            office_hours: OfficeHours::new(self.office_hours_start, self.office_hours_end)?,
            default_duration_minutes: self.default_duration_minutes,
            default_offset_days: self.default_offset_days,
            max_offset_drift_days: self.max_offset_drift_days,
        };
        config.validate()?;
        Ok(config)
    }

    /// The configured token file, or `token.json` next to the default config.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_path
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_NAME).join(TOKEN_FILE)))
    }
}

/// Pick the config file and whether it has to exist.
fn resolve_config_path(
    explicit: Option<&Path>,
    env_path: Option<OsString>,
    default_path: Option<PathBuf>,
) -> Option<(PathBuf, bool)> {
    if let Some(path) = explicit {
        Some((path.to_path_buf(), true))
    } else if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        Some((PathBuf::from(path), true))
    } else {
        default_path.map(|path| (path, false))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

// ── Tests ───────────────────────────────────────────────────────────────────
