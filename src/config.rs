use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::mcp::{ToolGroup, ToolProvider};

pub const CONFIG_FILE_NAME: &str = "gcal-mcp-config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar the event tools operate on
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Length of the `get-events` window when no end date is given
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,
    /// Zone used for wall-clock dates and times; system local time when unset
    #[serde(default)]
    pub time_zone: Option<Tz>,
}

fn default_calendar_id() -> String {
    "primary".to_owned()
}

fn default_days_ahead() -> u32 {
    7
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            days_ahead: default_days_ahead(),
            time_zone: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TasksConfig {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub calendar: Option<CalendarConfig>,
    pub tasks: Option<TasksConfig>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            calendar: Some(CalendarConfig::default()),
            tasks: Some(TasksConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config file as JSON")?;

        Ok(config)
    }

    pub fn load_default() -> Result<Self> {
        let mut config_paths = vec![PathBuf::from(format!("./{CONFIG_FILE_NAME}"))];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("gcal-mcp/config.json"));
        }

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading configuration from {}", path.display());
                return Self::load_from_file(path);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    pub fn is_tool_enabled<T: ToolProvider>(&self) -> bool {
        match T::GROUP {
            ToolGroup::Calendar => self.tools.calendar.is_some(),
            ToolGroup::Tasks => self.tools.tasks.is_some(),
        }
    }

    pub fn calendar(&self) -> CalendarConfig {
        self.tools.calendar.clone().unwrap_or_default()
    }
}

/// OAuth material read from the environment at startup.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Reads `GOOGLE_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).with_context(|| format!("Missing environment variable: {key}"))
        };

        let client_id = required("GOOGLE_CLIENT_ID")?;
        let client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let access_token = var("GOOGLE_ACCESS_TOKEN");
        let refresh_token = var("GOOGLE_REFRESH_TOKEN");

        if access_token.is_none() && refresh_token.is_none() {
            bail!("Either GOOGLE_ACCESS_TOKEN or GOOGLE_REFRESH_TOKEN must be set");
        }

        let expires_at = match var("GOOGLE_EXPIRY_DATE") {
            Some(raw) => {
                let millis: i64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid GOOGLE_EXPIRY_DATE: {raw}"))?;
                Some(
                    DateTime::from_timestamp_millis(millis)
                        .with_context(|| format!("GOOGLE_EXPIRY_DATE out of range: {raw}"))?,
                )
            }
            None => None,
        };

        Ok(Self {
            client_id,
            client_secret,
            access_token,
            refresh_token,
            expires_at,
        })
    }
}
