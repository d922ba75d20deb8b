//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is required but not set")]
    MissingVar(String),

    #[error("Environment variable {name} must be a valid number, got: {value}")]
    InvalidNumber { name: String, value: String },

    #[error("Environment variable {name} must be a boolean, got: {value}")]
    InvalidBool { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load env file: {0}")]
    EnvFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl From<dotenvy::Error> for ConfigError {
    fn from(e: dotenvy::Error) -> Self {
        ConfigError::EnvFile(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_var_error() {
        let err = ConfigError::MissingVar("MECKANO_EMAIL".to_string());
        assert_eq!(
            err.to_string(),
            "Environment variable MECKANO_EMAIL is required but not set"
        );
    }

    #[test]
    fn test_invalid_number_error() {
        let err = ConfigError::InvalidNumber {
            name: "MIN_WORK_HOURS".to_string(),
            value: "nine".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("MIN_WORK_HOURS"));
        assert!(display.contains("nine"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::from(io_err);
        assert!(err.to_string().contains("file not found"));
    }
}
