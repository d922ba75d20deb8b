//! Error types for the fill procedure.

use std::time::Duration;

use hourfill_browser::BrowserError;
use hourfill_config::ConfigError;
use thiserror::Error;

/// Errors that end the run or reject a single cell.
#[derive(Debug, Error)]
pub enum FillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Authentication did not complete within {0:?}")]
    AuthenticationTimeout(Duration),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Invalid time format: '{0}' (expected HH:MM)")]
    InvalidTimeFormat(String),

    #[error("Run did not finish within {0:?}")]
    RunTimeout(Duration),
}

impl FillError {
    /// Wrap a browser failure that happened while reaching a named page state.
    pub fn navigation(step: &str, err: BrowserError) -> Self {
        FillError::Navigation(format!("{}: {}", step, err))
    }
}

pub type Result<T> = std::result::Result<T, FillError>;
