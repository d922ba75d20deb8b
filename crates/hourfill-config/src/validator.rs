//! Configuration validation.

use url::Url;

use crate::schema::Settings;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate everything except the credentials.
    pub fn validate(settings: &Settings) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_portal(settings, &mut result);
        Self::validate_time(settings, &mut result);
        Self::validate_timeouts(settings, &mut result);
        Self::validate_browser(settings, &mut result);

        result
    }

    fn validate_portal(settings: &Settings, result: &mut ValidationResult) {
        let raw = &settings.portal.base_url;
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                result.add_error(ValidationError::new(
                    "portal.base_url",
                    format!("invalid URL '{}': {}", raw, e),
                ));
                return;
            }
        };

        match url.scheme() {
            "https" => {}
            "http" => result.add_warning(ValidationWarning::new(
                "portal.base_url",
                "credentials will be sent over plain http",
            )),
            scheme => result.add_error(ValidationError::new(
                "portal.base_url",
                format!("must be an http(s) URL, got scheme '{}'", scheme),
            )),
        }
    }

    fn validate_time(settings: &Settings, result: &mut ValidationResult) {
        let time = &settings.time;

        for (path, hour) in [
            ("time.min_entrance_hour", time.min_entrance_hour),
            ("time.max_entrance_hour", time.max_entrance_hour),
        ] {
            if hour > 23 {
                result.add_error(ValidationError::new(path, "hour must be between 0 and 23"));
            }
        }

        for (path, minute) in [
            ("time.min_entrance_minute", time.min_entrance_minute),
            ("time.max_entrance_minute", time.max_entrance_minute),
        ] {
            if minute > 59 {
                result.add_error(ValidationError::new(path, "minute must be between 0 and 59"));
            }
        }

        if time.entrance_start_minutes() >= time.entrance_end_minutes() {
            result.add_error(ValidationError::new(
                "time.max_entrance",
                "entrance window end must be after its start",
            ));
        }

        if time.min_work_hours > time.max_work_hours {
            result.add_error(ValidationError::new(
                "time.min_work_hours",
                "min_work_hours must not exceed max_work_hours",
            ));
        }

        if time.max_work_hours > 24 {
            result.add_error(ValidationError::new(
                "time.max_work_hours",
                "max_work_hours must be at most 24",
            ));
        }

        if time.max_work_hours >= 16 {
            result.add_warning(ValidationWarning::new(
                "time.max_work_hours",
                "work days of 16 hours or more wrap past midnight",
            ));
        }
    }

    fn validate_timeouts(settings: &Settings, result: &mut ValidationResult) {
        let timeouts = &settings.timeouts;
        for (path, value) in [
            ("timeouts.login_ms", timeouts.login_ms),
            ("timeouts.navigation_ms", timeouts.navigation_ms),
            ("timeouts.element_ms", timeouts.element_ms),
            ("timeouts.run_ms", timeouts.run_ms),
        ] {
            if value == 0 {
                result.add_error(ValidationError::new(path, "timeout must be greater than 0"));
            }
        }

        if timeouts.run_ms < timeouts.login_ms {
            result.add_warning(ValidationWarning::new(
                "timeouts.run_ms",
                "run budget is shorter than the login budget",
            ));
        }
    }

    fn validate_browser(settings: &Settings, result: &mut ValidationResult) {
        let browser = &settings.browser;
        if browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Port cannot be 0",
            ));
        }
        if browser.viewport_width == 0 || browser.viewport_height == 0 {
            result.add_error(ValidationError::new(
                "browser.viewport",
                "viewport dimensions must be positive",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
