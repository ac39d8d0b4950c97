//! Configuration settings structure
//!
//! Defines the client settings and how they are read from TOML files and
//! environment variables.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default portal root; the school code is appended as a path segment
pub const DEFAULT_BASE_URL: &str = "https://intranet.tam.ch/";

/// Browser identity the portal expects
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:87.0) Gecko/20100101 Firefox/87.0";

/// Main configuration settings for the intranet client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Portal location and endpoint identifiers
    pub portal: PortalSettings,
    /// HTTP behaviour
    pub http: HttpSettings,
    /// Timetable query behaviour
    pub timetable: TimetableSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Portal location and fixed endpoint identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Portal root URL, must end with `/`
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Period id sent to the resources endpoint
    pub period_id: String,
    /// Numeric ids of the `list/index/list/<id>` pages
    pub lists: ListIds,
}

/// Identifiers of the grid list pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListIds {
    pub absences: u32,
    pub classmates: u32,
    pub class_teachers: u32,
}

/// HTTP timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Timeout of the credential POST, in seconds
    pub login_timeout_secs: u64,
    /// Default timeout of every other request, in seconds
    pub request_timeout_secs: u64,
}

/// What to do when a custom timetable window starts at or after its end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateOrderPolicy {
    /// Log the inverted window and send the request anyway
    #[default]
    Warn,
    /// Fail with [`Error::BadTimestamp`]
    Reject,
}

/// Timetable configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableSettings {
    pub date_order: DateOrderPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            portal: PortalSettings::default(),
            http: HttpSettings::default(),
            timetable: TimetableSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            period_id: "75".to_string(),
            lists: ListIds::default(),
        }
    }
}

impl Default for ListIds {
    fn default() -> Self {
        Self {
            absences: 112,
            classmates: 45,
            class_teachers: 46,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            login_timeout_secs: 20,
            request_timeout_secs: 20,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            verbose: false,
        }
    }
}

impl HttpSettings {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings pointing at another portal root, mostly for tests and mirrors
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.portal.base_url = base_url.into();
        self
    }

    /// Settings with an explicit date order policy
    pub fn with_date_order(mut self, policy: DateOrderPolicy) -> Self {
        self.timetable.date_order = policy;
        self
    }

    /// Load settings from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid config file {:?}: {}", path, e)))
    }

    /// Load settings from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        Self::default().merge_with_env()
    }

    /// Override fields with any `OPENTAM_*` environment variables that are set
    pub fn merge_with_env(mut self) -> Result<Self> {
        if let Ok(base_url) = std::env::var("OPENTAM_BASE_URL") {
            self.portal.base_url = base_url;
        }

        if let Ok(user_agent) = std::env::var("OPENTAM_USER_AGENT") {
            self.portal.user_agent = user_agent;
        }

        if let Ok(timeout) = std::env::var("OPENTAM_TIMEOUT") {
            let secs: u64 = timeout
                .parse()
                .map_err(|e| Error::Config(format!("Invalid timeout: {}", e)))?;
            self.http.login_timeout_secs = secs;
            self.http.request_timeout_secs = secs;
        }

        if let Ok(policy) = std::env::var("OPENTAM_DATE_ORDER") {
            self.timetable.date_order = match policy.to_lowercase().as_str() {
                "warn" => DateOrderPolicy::Warn,
                "reject" => DateOrderPolicy::Reject,
                other => {
                    return Err(Error::Config(format!("Invalid date order policy: {}", other)));
                }
            };
        }

        if let Ok(level) = std::env::var("OPENTAM_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Check the settings can actually drive a client
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.portal.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL: {}", e)))?;
        if !url.path().ends_with('/') {
            return Err(Error::config("Base URL must end with '/'"));
        }
        if self.http.login_timeout_secs == 0 || self.http.request_timeout_secs == 0 {
            return Err(Error::config("Timeouts must be greater than zero"));
        }
        if self.portal.user_agent.trim().is_empty() {
            return Err(Error::config("User agent must not be empty"));
        }
        Ok(())
    }
}
