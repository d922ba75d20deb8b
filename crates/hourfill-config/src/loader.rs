//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::schema::{ConfigOverrides, Credentials, FillerConfig, Settings};
use crate::validator::ConfigValidator;

/// Environment variable names recognised by the loader.
pub mod env_vars {
    pub const EMAIL: &str = "MECKANO_EMAIL";
    pub const PASSWORD: &str = "MECKANO_PASSWORD";
    pub const BASE_URL: &str = "MECKANO_BASE_URL";

    pub const MIN_ENTRANCE_HOUR: &str = "MIN_ENTRANCE_HOUR";
    pub const MIN_ENTRANCE_MINUTE: &str = "MIN_ENTRANCE_MINUTE";
    pub const MAX_ENTRANCE_HOUR: &str = "MAX_ENTRANCE_HOUR";
    pub const MAX_ENTRANCE_MINUTE: &str = "MAX_ENTRANCE_MINUTE";
    pub const MIN_WORK_HOURS: &str = "MIN_WORK_HOURS";
    pub const MAX_WORK_HOURS: &str = "MAX_WORK_HOURS";

    pub const LOGIN_TIMEOUT_MS: &str = "LOGIN_TIMEOUT_MS";
    pub const NAVIGATION_TIMEOUT_MS: &str = "NAVIGATION_TIMEOUT_MS";
    pub const ELEMENT_TIMEOUT_MS: &str = "ELEMENT_TIMEOUT_MS";
    pub const RUN_TIMEOUT_MS: &str = "RUN_TIMEOUT_MS";

    pub const CHROME_DEBUG_PORT: &str = "CHROME_DEBUG_PORT";
    pub const CHROME_HEADLESS: &str = "CHROME_HEADLESS";
    pub const CHROME_PROFILE_DIR: &str = "CHROME_PROFILE_DIR";
    pub const VIEWPORT_WIDTH: &str = "VIEWPORT_WIDTH";
    pub const VIEWPORT_HEIGHT: &str = "VIEWPORT_HEIGHT";
}

/// Builds a [`FillerConfig`] from defaults, an optional TOML file and the
/// environment, in that order of precedence (environment wins).
pub struct ConfigLoader;

impl ConfigLoader {
    /// Seed the process environment from a `.env` file.
    ///
    /// With an explicit path the file must exist. Without one, `.env` is
    /// looked up from the current directory upwards and silently skipped if
    /// absent. Variables already set in the environment are not overridden.
    pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        match path {
            Some(p) => {
                dotenvy::from_path(p)?;
                Ok(Some(p.to_path_buf()))
            }
            None => match dotenvy::dotenv() {
                Ok(found) => Ok(Some(found)),
                Err(e) if e.not_found() => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Load configuration using the process environment.
    pub fn load(file: Option<&Path>) -> Result<FillerConfig, ConfigError> {
        Self::load_with_overrides(file, &ConfigOverrides::default())
    }

    /// Like [`load`](Self::load), with command-line values layered on top.
    pub fn load_with_overrides(
        file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<FillerConfig, ConfigError> {
        let content = match file {
            Some(path) => Some(fs::read_to_string(path)?),
            None => None,
        };
        Self::resolve(content.as_deref(), |name| std::env::var(name).ok(), overrides)
    }

    /// Load configuration from optional TOML content and a variable lookup.
    pub fn load_with<F>(content: Option<&str>, lookup: F) -> Result<FillerConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(content, lookup, &ConfigOverrides::default())
    }

    /// Layer defaults, TOML, environment and overrides, then validate.
    pub fn resolve<F>(
        content: Option<&str>,
        lookup: F,
        overrides: &ConfigOverrides,
    ) -> Result<FillerConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match content {
            Some(content) => {
                let expanded = Self::expand_env_vars(content, &lookup)?;
                toml::from_str::<Settings>(&expanded)?
            }
            None => Settings::default(),
        };

        Self::apply_env(&mut settings, &lookup)?;
        Self::apply_overrides(&mut settings, overrides);
        let credentials = Self::credentials(&settings)?;

        let result = ConfigValidator::validate(&settings);
        if !result.is_valid() {
            let messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect();
            return Err(ConfigError::Invalid(messages.join("; ")));
        }

        let Settings {
            portal,
            timeouts,
            time,
            browser,
            ..
        } = settings;

        Ok(FillerConfig {
            credentials,
            portal,
            timeouts,
            time,
            browser,
            warnings: result.warnings,
        })
    }

    fn credentials(settings: &Settings) -> Result<Credentials, ConfigError> {
        let email = non_blank(settings.account.email.as_deref())
            .ok_or_else(|| ConfigError::MissingVar(env_vars::EMAIL.to_string()))?;
        let password = non_blank(settings.account.password.as_deref())
            .ok_or_else(|| ConfigError::MissingVar(env_vars::PASSWORD.to_string()))?;

        Ok(Credentials {
            email,
            password: SecretString::from(password),
        })
    }

    /// Overlay recognised environment variables onto the settings.
    fn apply_env<F>(settings: &mut Settings, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        use env_vars::*;

        if let Some(email) = env_string(lookup, EMAIL) {
            settings.account.email = Some(email);
        }
        if let Some(password) = env_string(lookup, PASSWORD) {
            settings.account.password = Some(password);
        }
        if let Some(url) = env_string(lookup, BASE_URL) {
            settings.portal.base_url = url;
        }

        let time = &mut settings.time;
        overlay(&mut time.min_entrance_hour, env_number(lookup, MIN_ENTRANCE_HOUR)?);
        overlay(&mut time.min_entrance_minute, env_number(lookup, MIN_ENTRANCE_MINUTE)?);
        overlay(&mut time.max_entrance_hour, env_number(lookup, MAX_ENTRANCE_HOUR)?);
        overlay(&mut time.max_entrance_minute, env_number(lookup, MAX_ENTRANCE_MINUTE)?);
        overlay(&mut time.min_work_hours, env_number(lookup, MIN_WORK_HOURS)?);
        overlay(&mut time.max_work_hours, env_number(lookup, MAX_WORK_HOURS)?);

        let timeouts = &mut settings.timeouts;
        overlay(&mut timeouts.login_ms, env_number(lookup, LOGIN_TIMEOUT_MS)?);
        overlay(&mut timeouts.navigation_ms, env_number(lookup, NAVIGATION_TIMEOUT_MS)?);
        overlay(&mut timeouts.element_ms, env_number(lookup, ELEMENT_TIMEOUT_MS)?);
        overlay(&mut timeouts.run_ms, env_number(lookup, RUN_TIMEOUT_MS)?);

        let browser = &mut settings.browser;
        overlay(&mut browser.debug_port, env_number(lookup, CHROME_DEBUG_PORT)?);
        overlay(&mut browser.headless, env_bool(lookup, CHROME_HEADLESS)?);
        overlay(&mut browser.viewport_width, env_number(lookup, VIEWPORT_WIDTH)?);
        overlay(&mut browser.viewport_height, env_number(lookup, VIEWPORT_HEIGHT)?);
        if let Some(dir) = env_string(lookup, CHROME_PROFILE_DIR) {
            browser.profile_dir = Some(PathBuf::from(Self::expand_path(&dir)));
        } else if let Some(dir) = browser.profile_dir.take() {
            browser.profile_dir = Some(PathBuf::from(Self::expand_path(&dir.to_string_lossy())));
        }

        Ok(())
    }

    fn apply_overrides(settings: &mut Settings, overrides: &ConfigOverrides) {
        let browser = &mut settings.browser;
        overlay(&mut browser.headless, overrides.headless);
        overlay(&mut browser.debug_port, overrides.debug_port);
        if let Some(dir) = &overrides.profile_dir {
            browser.profile_dir = Some(PathBuf::from(Self::expand_path(&dir.to_string_lossy())));
        }
    }

    /// Expand variable references in the format `${VAR}`.
    fn expand_env_vars<F>(content: &str, lookup: &F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value =
                lookup(var_name).ok_or_else(|| ConfigError::MissingVar(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.hourfill`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn env_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup(name).as_deref())
}

fn env_number<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match env_string(lookup, name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                name: name.to_string(),
                value: raw,
            }),
    }
}

fn env_bool<F>(lookup: &F, name: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env_string(lookup, name) {
        None => Ok(None),
        Some(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidBool {
                name: name.to_string(),
                value: raw,
            }),
        },
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
