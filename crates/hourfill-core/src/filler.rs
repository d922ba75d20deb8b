//! Write-verify of a single time cell.

use std::time::Duration;

use hourfill_browser::BrowserError;
use tracing::{debug, info, warn};

use crate::error::FillError;
use crate::portal::{CellRef, ReportTable};
use crate::time::is_valid_time_format;

/// Write attempts per cell before giving up.
pub const MAX_ATTEMPTS: u32 = 3;

/// Pauses and waits of one write attempt.
#[derive(Debug, Clone)]
pub struct FillTiming {
    /// After clicking the cell, before clearing it.
    pub click_settle: Duration,
    /// Between typed characters.
    pub key_delay: Duration,
    /// After pressing Enter, before reading back.
    pub confirm_settle: Duration,
    /// Budget for the display span to become visible.
    pub display_timeout: Duration,
    /// Extra wait before re-reading an empty display span.
    pub empty_recheck: Duration,
    /// Between failed attempts.
    pub retry_pause: Duration,
}

impl Default for FillTiming {
    fn default() -> Self {
        Self {
            click_settle: Duration::from_millis(300),
            key_delay: Duration::from_millis(100),
            confirm_settle: Duration::from_millis(500),
            display_timeout: Duration::from_secs(5),
            empty_recheck: Duration::from_secs(1),
            retry_pause: Duration::from_millis(500),
        }
    }
}

/// Result of filling one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOutcome {
    pub succeeded: bool,
    pub final_value: Option<String>,
    /// The cell already held a value and was left untouched.
    pub was_already_present: bool,
    pub error_detail: Option<String>,
}

impl FillOutcome {
    pub fn already_present(value: String) -> Self {
        Self {
            succeeded: true,
            final_value: Some(value),
            was_already_present: true,
            error_detail: None,
        }
    }

    pub fn written(value: String) -> Self {
        Self {
            succeeded: true,
            final_value: Some(value),
            was_already_present: false,
            error_detail: None,
        }
    }

    pub fn failed(detail: String, last_seen: Option<String>) -> Self {
        Self {
            succeeded: false,
            final_value: last_seen,
            was_already_present: false,
            error_detail: Some(detail),
        }
    }

    /// Whether this fill wrote a new value into the cell.
    pub fn wrote(&self) -> bool {
        self.succeeded && !self.was_already_present
    }
}

/// Current value of a cell: the edit control when it is visible, otherwise
/// the display span. Empty when neither holds text.
pub async fn read_current_value<T: ReportTable + ?Sized>(
    table: &T,
    cell: CellRef,
) -> Result<String, BrowserError> {
    match table.probe_input(cell).await? {
        Some(probe) if probe.visible => {
            let value = probe.value.trim().to_string();
            debug!(%cell, value = %value, "Read visible input");
            Ok(value)
        }
        probe => {
            let value = table.display_text(cell).await?;
            debug!(%cell, value = %value, has_input = probe.is_some(), "Read display span");
            Ok(value)
        }
    }
}

/// Fills empty cells and verifies the portal accepted the value.
pub struct CellFiller<'a, T: ReportTable + ?Sized> {
    table: &'a T,
    timing: FillTiming,
}

impl<'a, T: ReportTable + ?Sized> CellFiller<'a, T> {
    pub fn new(table: &'a T) -> Self {
        Self::with_timing(table, FillTiming::default())
    }

    pub fn with_timing(table: &'a T, timing: FillTiming) -> Self {
        Self { table, timing }
    }

    pub fn timing(&self) -> &FillTiming {
        &self.timing
    }

    /// Fill `cell` with `target` unless it already holds a value.
    ///
    /// An unreadable cell or a malformed `target` is an error. A cell that
    /// never shows `target` after [`MAX_ATTEMPTS`] writes is a failed
    /// outcome.
    pub async fn fill_cell(&self, cell: CellRef, target: &str) -> Result<FillOutcome, FillError> {
        let current = read_current_value(self.table, cell).await?;
        if !current.is_empty() {
            info!(%cell, value = %current, "Cell already filled, skipping");
            return Ok(FillOutcome::already_present(current));
        }

        if !is_valid_time_format(target) {
            return Err(FillError::InvalidTimeFormat(target.to_string()));
        }

        let mut last_seen: Option<String> = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(cell, target).await {
                Ok(seen) if seen.contains(target) => {
                    info!(%cell, value = target, attempt, "Filled cell");
                    return Ok(FillOutcome::written(seen));
                }
                Ok(seen) => {
                    warn!(%cell, expected = target, got = %seen, attempt, "Verification failed");
                    last_seen = Some(seen);
                }
                Err(e) => {
                    warn!(%cell, attempt, error = %e, "Cell not ready");
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(self.timing.retry_pause).await;
            }
        }

        let detail = match &last_seen {
            Some(seen) => format!(
                "failed to fill \"{}\" after {} attempts (last seen \"{}\")",
                target, MAX_ATTEMPTS, seen
            ),
            None => format!("failed to fill \"{}\" after {} attempts", target, MAX_ATTEMPTS),
        };
        Ok(FillOutcome::failed(detail, last_seen))
    }

    /// One click, clear, type, confirm, read-back cycle. Returns the
    /// displayed text after the write.
    async fn attempt(&self, cell: CellRef, target: &str) -> Result<String, BrowserError> {
        let t = &self.timing;

        self.table.click_cell(cell).await?;
        tokio::time::sleep(t.click_settle).await;

        self.table.clear_focused().await?;
        self.table.type_slowly(target, t.key_delay).await?;
        self.table.confirm().await?;
        tokio::time::sleep(t.confirm_settle).await;

        self.table.wait_display_visible(cell, t.display_timeout).await?;
        let mut seen = self.table.display_text(cell).await?;
        if seen.is_empty() {
            debug!(%cell, "Display empty after typing, rechecking");
            tokio::time::sleep(t.empty_recheck).await;
            seen = self.table.display_text(cell).await?;
        }
        Ok(seen)
    }
}
