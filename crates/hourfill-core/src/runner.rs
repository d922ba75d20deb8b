//! Row loop: walk the report, fill workday rows, tally the run.

use std::fmt;
use std::time::Duration;

use hourfill_config::TimeWindow;
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::filler::{CellFiller, FillOutcome};
use crate::portal::{CellRef, ReportTable};
use crate::row::{RowEnumerator, RowRecord, ScannedRow};
use crate::time::generate_time_entry;

/// Counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows in the table when enumeration started.
    pub total: usize,
    /// Workday rows whose both cells ended up filled.
    pub processed: usize,
    /// Processed rows where at least one cell was newly written.
    pub filled: usize,
    /// Non-workday and malformed rows.
    pub skipped: usize,
    /// Rows abandoned because a cell failed.
    pub errors: usize,
}

impl RunSummary {
    /// Whether the run left the report exactly as it found it.
    pub fn is_noop(&self) -> bool {
        self.filled == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} processed, {} filled, {} skipped, {} errors",
            self.total, self.processed, self.filled, self.skipped, self.errors
        )
    }
}

/// Waits between rows while the table re-renders.
#[derive(Debug, Clone)]
pub struct RowTiming {
    /// After a workday row, before looking at the next one.
    pub row_settle: Duration,
    /// Budget for the next row's entrance cell to become visible.
    pub next_row_timeout: Duration,
    /// After the next row is visible.
    pub next_row_settle: Duration,
}

impl Default for RowTiming {
    fn default() -> Self {
        Self {
            row_settle: Duration::from_secs(1),
            next_row_timeout: Duration::from_secs(5),
            next_row_settle: Duration::from_millis(300),
        }
    }
}

enum RowResult {
    Done { wrote: bool },
    Failed,
}

/// Drives the cell filler over every row of the report.
pub struct RowLoop<'a, T: ReportTable + ?Sized, R: Rng> {
    table: &'a T,
    filler: CellFiller<'a, T>,
    window: &'a TimeWindow,
    rng: R,
    timing: RowTiming,
}

impl<'a, T: ReportTable + ?Sized, R: Rng> RowLoop<'a, T, R> {
    pub fn new(table: &'a T, window: &'a TimeWindow, rng: R) -> Self {
        Self {
            table,
            filler: CellFiller::new(table),
            window,
            rng,
            timing: RowTiming::default(),
        }
    }

    pub fn with_filler(mut self, filler: CellFiller<'a, T>) -> Self {
        self.filler = filler;
        self
    }

    pub fn with_timing(mut self, timing: RowTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Visit every row once. Row failures are counted, never returned;
    /// only failing to read the row count ends the loop with an error.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut rows = RowEnumerator::start(self.table).await?;
        let mut summary = RunSummary {
            total: rows.total(),
            ..Default::default()
        };
        info!(total = summary.total, "Found report rows");

        while let Some((index, scanned)) = rows.next().await {
            let record = match scanned {
                Ok(ScannedRow::Record(record)) => record,
                Ok(ScannedRow::Malformed { cells, .. }) => {
                    info!(row = index, cells, "Not enough cells, skipping");
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!(row = index, error = %e, "Could not read row");
                    summary.errors += 1;
                    continue;
                }
            };

            if record.is_non_workday {
                info!(row = index, date = %record.date_label, "Non-workday, skipping");
                summary.skipped += 1;
                continue;
            }

            match self.fill_row(&record).await {
                RowResult::Done { wrote } => {
                    summary.processed += 1;
                    if wrote {
                        summary.filled += 1;
                    }
                }
                RowResult::Failed => summary.errors += 1,
            }

            self.await_next_row(rows.has_next().then(|| CellRef::entrance(index + 1)))
                .await;
        }

        info!(
            total = summary.total,
            processed = summary.processed,
            filled = summary.filled,
            skipped = summary.skipped,
            errors = summary.errors,
            noop = summary.is_noop(),
            "Run complete"
        );
        Ok(summary)
    }

    async fn fill_row(&mut self, record: &RowRecord) -> RowResult {
        let entry = generate_time_entry(self.window, &mut self.rng);
        info!(
            row = record.index,
            date = %record.date_label,
            entrance = %entry.entrance,
            exit = %entry.exit,
            "Filling row"
        );

        let Some(entrance) = self.fill_one(record.entrance, &entry.entrance).await else {
            return RowResult::Failed;
        };
        let Some(exit) = self.fill_one(record.exit, &entry.exit).await else {
            return RowResult::Failed;
        };

        RowResult::Done {
            wrote: entrance.wrote() || exit.wrote(),
        }
    }

    /// Fill one cell, logging and discarding the failure. `None` means the
    /// row must be abandoned.
    async fn fill_one(&self, cell: CellRef, target: &str) -> Option<FillOutcome> {
        match self.filler.fill_cell(cell, target).await {
            Ok(outcome) if outcome.succeeded => Some(outcome),
            Ok(outcome) => {
                error!(
                    %cell,
                    detail = outcome.error_detail.as_deref().unwrap_or("unknown"),
                    "Cell fill failed, abandoning row"
                );
                None
            }
            Err(e) => {
                error!(%cell, error = %e, "Cell fill failed, abandoning row");
                None
            }
        }
    }

    async fn await_next_row(&self, next: Option<CellRef>) {
        tokio::time::sleep(self.timing.row_settle).await;

        let Some(cell) = next else {
            return;
        };
        debug!(row = cell.row, "Waiting for next row");
        match self
            .table
            .wait_cell_visible(cell, self.timing.next_row_timeout)
            .await
        {
            Ok(()) => tokio::time::sleep(self.timing.next_row_settle).await,
            Err(e) => warn!(row = cell.row, error = %e, "Next row not ready, continuing"),
        }
    }
}
