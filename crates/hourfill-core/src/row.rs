//! Row model and enumeration of the report table.

use hourfill_browser::BrowserError;
use tracing::debug;

use crate::portal::{CellRef, ReportTable};

/// Rows with fewer cells than this carry no time columns.
pub const MIN_CELLS: usize = 4;

/// Day-name glyphs of the days off: Friday (ו) and Saturday (ש).
pub const NON_WORKDAY_GLYPHS: [char; 2] = ['ו', 'ש'];

/// Whether a date label names a Friday or Saturday.
pub fn is_non_workday(date_label: &str) -> bool {
    date_label.contains(&NON_WORKDAY_GLYPHS[..])
}

/// One well-formed row of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    pub index: usize,
    pub date_label: String,
    pub is_non_workday: bool,
    pub entrance: CellRef,
    pub exit: CellRef,
}

impl RowRecord {
    pub fn new(index: usize, date_label: String) -> Self {
        let is_non_workday = is_non_workday(&date_label);
        Self {
            index,
            date_label,
            is_non_workday,
            entrance: CellRef::entrance(index),
            exit: CellRef::exit(index),
        }
    }
}

/// Result of reading one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedRow {
    Record(RowRecord),
    /// Too few cells to hold a date and two times.
    Malformed { index: usize, cells: usize },
}

/// Forward-only walk over the table's rows.
///
/// The row count is fixed when the walk starts. Each call to
/// [`next`](Self::next) reads one row from the live table.
pub struct RowEnumerator<'a, T: ReportTable + ?Sized> {
    table: &'a T,
    total: usize,
    position: usize,
}

impl<'a, T: ReportTable + ?Sized> RowEnumerator<'a, T> {
    pub async fn start(table: &'a T) -> Result<Self, BrowserError> {
        let total = table.row_count().await?;
        debug!(total, "Enumerating report rows");
        Ok(Self { table, total, position: 0 })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether another row follows the one last returned.
    pub fn has_next(&self) -> bool {
        self.position < self.total
    }

    /// Read the next row. Returns `None` once every row has been visited.
    ///
    /// A read failure still advances the walk; the caller gets the failed
    /// row's index alongside the error.
    pub async fn next(&mut self) -> Option<(usize, Result<ScannedRow, BrowserError>)> {
        if !self.has_next() {
            return None;
        }
        let index = self.position;
        self.position += 1;
        Some((index, self.scan(index).await))
    }

    async fn scan(&self, index: usize) -> Result<ScannedRow, BrowserError> {
        let cells = self.table.cell_count(index).await?;
        if cells < MIN_CELLS {
            return Ok(ScannedRow::Malformed { index, cells });
        }
        let label = self.table.date_label(index).await?;
        Ok(ScannedRow::Record(RowRecord::new(index, label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::Column;

    #[test]
    fn test_non_workday_glyphs() {
        assert!(is_non_workday("ו 05/09"));
        assert!(is_non_workday("05/09 ש"));
        assert!(!is_non_workday("ב 01/09"));
        assert!(!is_non_workday(""));
    }

    #[test]
    fn test_row_record_cells() {
        let record = RowRecord::new(4, "ג 02/09".to_string());
        assert!(!record.is_non_workday);
        assert_eq!(record.entrance, CellRef { row: 4, column: Column::Entrance });
        assert_eq!(record.exit, CellRef { row: 4, column: Column::Exit });
        assert_eq!(record.entrance.column.cell_index(), 2);
        assert_eq!(record.exit.column.cell_index(), 3);
    }

    #[test]
    fn test_row_record_weekend() {
        assert!(RowRecord::new(0, "ש 06/09".to_string()).is_non_workday);
    }
}
