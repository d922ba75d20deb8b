//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::validator::ValidationWarning;

/// Fully resolved configuration for one run.
///
/// Built once at process start by [`crate::ConfigLoader`] and passed by
/// reference to the bootstrap and row loop.
#[derive(Debug)]
pub struct FillerConfig {
    pub credentials: Credentials,
    pub portal: PortalConfig,
    pub timeouts: TimeoutConfig,
    pub time: TimeWindow,
    pub browser: BrowserConfig,
    /// Non-fatal findings from validation, for the caller to log.
    pub warnings: Vec<ValidationWarning>,
}

/// Values given on the command line. Applied after the environment, before
/// validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub headless: Option<bool>,
    pub debug_port: Option<u16>,
    pub profile_dir: Option<PathBuf>,
}

/// Portal account credentials.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    /// Never logged; `Debug` prints a redaction marker.
    pub password: SecretString,
}

/// Everything except the credentials, as read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub account: AccountSection,

    #[serde(default)]
    pub portal: PortalConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub time: TimeWindow,

    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Optional credential section of the TOML file.
///
/// Usually left empty in favour of `MECKANO_EMAIL` / `MECKANO_PASSWORD`,
/// or filled with `${VAR}` references.
#[derive(Clone, Default, Deserialize)]
pub struct AccountSection {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for AccountSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSection")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Portal location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://app.meckano.co.il".to_string()
}

/// Wait budgets, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Login submit until the authenticated URL appears. Covers a manual
    /// second-factor step.
    #[serde(default = "default_login_ms")]
    pub login_ms: u64,

    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: u64,

    #[serde(default = "default_element_ms")]
    pub element_ms: u64,

    /// Upper bound for the whole run.
    #[serde(default = "default_run_ms")]
    pub run_ms: u64,
}

impl TimeoutConfig {
    pub fn login(&self) -> Duration {
        Duration::from_millis(self.login_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn run(&self) -> Duration {
        Duration::from_millis(self.run_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            login_ms: default_login_ms(),
            navigation_ms: default_navigation_ms(),
            element_ms: default_element_ms(),
            run_ms: default_run_ms(),
        }
    }
}

fn default_login_ms() -> u64 {
    120_000
}

fn default_navigation_ms() -> u64 {
    20_000
}

fn default_element_ms() -> u64 {
    15_000
}

fn default_run_ms() -> u64 {
    600_000
}

/// Window used to generate entrance and exit times.
///
/// Entrance times fall in `[min_entrance, max_entrance)`; the work duration
/// falls in `[min_work_hours, max_work_hours]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default = "default_min_entrance_hour")]
    pub min_entrance_hour: u32,

    #[serde(default = "default_min_entrance_minute")]
    pub min_entrance_minute: u32,

    #[serde(default = "default_max_entrance_hour")]
    pub max_entrance_hour: u32,

    #[serde(default = "default_max_entrance_minute")]
    pub max_entrance_minute: u32,

    #[serde(default = "default_min_work_hours")]
    pub min_work_hours: u32,

    #[serde(default = "default_max_work_hours")]
    pub max_work_hours: u32,
}

impl TimeWindow {
    /// Window start in minutes after midnight.
    pub fn entrance_start_minutes(&self) -> u32 {
        self.min_entrance_hour * 60 + self.min_entrance_minute
    }

    /// Window end (exclusive) in minutes after midnight.
    pub fn entrance_end_minutes(&self) -> u32 {
        self.max_entrance_hour * 60 + self.max_entrance_minute
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            min_entrance_hour: default_min_entrance_hour(),
            min_entrance_minute: default_min_entrance_minute(),
            max_entrance_hour: default_max_entrance_hour(),
            max_entrance_minute: default_max_entrance_minute(),
            min_work_hours: default_min_work_hours(),
            max_work_hours: default_max_work_hours(),
        }
    }
}

fn default_min_entrance_hour() -> u32 {
    7
}

fn default_min_entrance_minute() -> u32 {
    45
}

fn default_max_entrance_hour() -> u32 {
    9
}

fn default_max_entrance_minute() -> u32 {
    30
}

fn default_min_work_hours() -> u32 {
    9
}

fn default_max_work_hours() -> u32 {
    10
}

/// Chrome process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    /// Persistent profile directory; `~` is expanded.
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl BrowserConfig {
    /// Profile directory, falling back to `~/.hourfill/browser-profile`.
    pub fn resolved_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".hourfill")
                .join("browser-profile")
        })
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            profile_dir: None,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
