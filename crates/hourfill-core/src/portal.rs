//! Page capabilities the fill procedure depends on.
//!
//! The procedure never touches the browser directly. [`LoginSurface`] covers
//! the login and navigation steps, [`ReportTable`] covers reading and editing
//! the monthly report. [`crate::CdpPortal`] is the live implementation; tests
//! substitute an in-memory table.

use std::time::Duration;

use async_trait::async_trait;
use hourfill_browser::BrowserError;
use serde::Deserialize;

/// Editable time column of a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Entrance,
    Exit,
}

impl Column {
    /// Zero-based `td` index of the column within its row.
    pub fn cell_index(self) -> usize {
        match self {
            Column::Entrance => 2,
            Column::Exit => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Entrance => "entrance",
            Column::Exit => "exit",
        }
    }
}

/// Locator for one time cell.
///
/// Holds no element handle: every action resolves the cell against the live
/// table again, so a re-render between two actions is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub column: Column,
}

impl CellRef {
    pub fn entrance(row: usize) -> Self {
        Self { row, column: Column::Entrance }
    }

    pub fn exit(row: usize) -> Self {
        Self { row, column: Column::Exit }
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {} {}", self.row, self.column.as_str())
    }
}

/// State of a cell's edit control, when it has one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InputProbe {
    pub visible: bool,
    #[serde(default)]
    pub value: String,
}

/// Login form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Identifier,
    Secret,
}

/// Login view and post-login navigation.
#[async_trait]
pub trait LoginSurface: Send + Sync {
    /// Load a URL and wait for the document to finish loading.
    async fn open(&self, url: &str) -> Result<(), BrowserError>;

    /// Replace the contents of a login field.
    async fn fill_login_field(&self, field: LoginField, value: &str) -> Result<(), BrowserError>;

    /// Activate the login form's submit control.
    async fn submit_login(&self) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Wait until a visible element's trimmed text equals `text`.
    async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Click the first link whose text contains `text`.
    async fn click_link(&self, text: &str) -> Result<(), BrowserError>;

    /// Wait until the report table and its date header are visible.
    async fn wait_for_report_table(&self, header: &str, timeout: Duration)
    -> Result<(), BrowserError>;

    /// Close a blocking modal if one is open. Returns whether one was found.
    async fn dismiss_dialog(&self) -> Result<bool, BrowserError>;
}

/// The monthly report table.
///
/// Rows are addressed by zero-based document order; cells by [`CellRef`].
#[async_trait]
pub trait ReportTable: Send + Sync {
    async fn row_count(&self) -> Result<usize, BrowserError>;

    /// Number of `td` cells in a row.
    async fn cell_count(&self, row: usize) -> Result<usize, BrowserError>;

    /// Trimmed date label of a row; empty when the label element is missing.
    async fn date_label(&self, row: usize) -> Result<String, BrowserError>;

    /// The cell's `input`, or `None` if it has none.
    async fn probe_input(&self, cell: CellRef) -> Result<Option<InputProbe>, BrowserError>;

    /// Trimmed text of the cell's display span; empty when there is none.
    async fn display_text(&self, cell: CellRef) -> Result<String, BrowserError>;

    async fn wait_cell_visible(&self, cell: CellRef, timeout: Duration)
    -> Result<(), BrowserError>;

    async fn wait_display_visible(
        &self,
        cell: CellRef,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    async fn click_cell(&self, cell: CellRef) -> Result<(), BrowserError>;

    /// Select all content of the focused control and delete it.
    async fn clear_focused(&self) -> Result<(), BrowserError>;

    /// Type into the focused control one key at a time.
    async fn type_slowly(&self, text: &str, delay: Duration) -> Result<(), BrowserError>;

    /// Commit the focused control (Enter).
    async fn confirm(&self) -> Result<(), BrowserError>;
}
