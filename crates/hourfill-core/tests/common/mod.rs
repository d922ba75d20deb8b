//! In-memory portal used by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use hourfill_browser::BrowserError;
use hourfill_core::{CellRef, Column, InputProbe, LoginField, LoginSurface, ReportTable};
use parking_lot::Mutex;

/// How a cell reacts to Enter.
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    /// The display span shows what was typed.
    Accept,
    /// The display span shows this text instead.
    Show(String),
    /// The display span stays empty on the first read, then shows the typed text.
    AcceptLate,
}

#[derive(Debug, Clone)]
pub struct FakeCell {
    pub input: Option<InputProbe>,
    pub display: String,
    pub commit: Commit,
    /// Number of upcoming clicks that fail with `ElementNotFound`.
    pub failing_clicks: u32,
    /// Display span never becomes visible.
    pub display_hidden: bool,
    late_pending: bool,
}

impl FakeCell {
    pub fn empty() -> Self {
        Self {
            input: None,
            display: String::new(),
            commit: Commit::Accept,
            failing_clicks: 0,
            display_hidden: false,
            late_pending: false,
        }
    }

    pub fn showing(text: &str) -> Self {
        Self {
            display: text.to_string(),
            ..Self::empty()
        }
    }

    pub fn with_input(mut self, visible: bool, value: &str) -> Self {
        self.input = Some(InputProbe {
            visible,
            value: value.to_string(),
        });
        self
    }

    pub fn commit(mut self, commit: Commit) -> Self {
        self.commit = commit;
        self
    }

    pub fn failing_clicks(mut self, n: u32) -> Self {
        self.failing_clicks = n;
        self
    }

    pub fn display_hidden(mut self) -> Self {
        self.display_hidden = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeRow {
    pub cells: usize,
    pub label: String,
    pub entrance: FakeCell,
    pub exit: FakeCell,
}

impl FakeRow {
    pub fn workday(label: &str) -> Self {
        Self {
            cells: 6,
            label: label.to_string(),
            entrance: FakeCell::empty(),
            exit: FakeCell::empty(),
        }
    }

    /// A row too short to carry time cells.
    pub fn short(cells: usize) -> Self {
        Self {
            cells,
            label: String::new(),
            entrance: FakeCell::empty(),
            exit: FakeCell::empty(),
        }
    }

    pub fn entrance(mut self, cell: FakeCell) -> Self {
        self.entrance = cell;
        self
    }

    pub fn exit(mut self, cell: FakeCell) -> Self {
        self.exit = cell;
        self
    }
}

#[derive(Default)]
struct TableState {
    rows: Vec<FakeRow>,
    focused: Option<CellRef>,
    buffer: String,
    calls: Vec<String>,
    fail_row_count: bool,
    fail_next_row_wait: bool,
}

/// Report table backed by a vector of rows.
pub struct FakeTable {
    state: Mutex<TableState>,
}

impl FakeTable {
    pub fn new(rows: Vec<FakeRow>) -> Self {
        Self {
            state: Mutex::new(TableState {
                rows,
                ..Default::default()
            }),
        }
    }

    pub fn single(cell: FakeCell) -> Self {
        Self::new(vec![FakeRow::workday("ב 01/09").entrance(cell)])
    }

    pub fn fail_row_count(self) -> Self {
        self.state.lock().fail_row_count = true;
        self
    }

    pub fn fail_next_row_wait(self) -> Self {
        self.state.lock().fail_next_row_wait = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Calls that touched the given row.
    pub fn calls_for_row(&self, row: usize) -> Vec<String> {
        let tag = format!("row {} ", row);
        self.calls()
            .into_iter()
            .filter(|c| c.contains(&tag))
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn display(&self, cell: CellRef) -> String {
        let state = self.state.lock();
        Self::cell(&state.rows, cell).display.clone()
    }

    fn cell(rows: &[FakeRow], cell: CellRef) -> &FakeCell {
        let row = &rows[cell.row];
        match cell.column {
            Column::Entrance => &row.entrance,
            Column::Exit => &row.exit,
        }
    }

    fn cell_mut(rows: &mut [FakeRow], cell: CellRef) -> &mut FakeCell {
        let row = &mut rows[cell.row];
        match cell.column {
            Column::Entrance => &mut row.entrance,
            Column::Exit => &mut row.exit,
        }
    }
}

#[async_trait]
impl ReportTable for FakeTable {
    async fn row_count(&self) -> Result<usize, BrowserError> {
        let mut state = self.state.lock();
        state.calls.push("row_count".to_string());
        if state.fail_row_count {
            return Err(BrowserError::NotConnected);
        }
        Ok(state.rows.len())
    }

    async fn cell_count(&self, row: usize) -> Result<usize, BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("cell_count row {} ", row));
        Ok(state.rows[row].cells)
    }

    async fn date_label(&self, row: usize) -> Result<String, BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("date_label row {} ", row));
        Ok(state.rows[row].label.clone())
    }

    async fn probe_input(&self, cell: CellRef) -> Result<Option<InputProbe>, BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("probe {} ", cell));
        Ok(Self::cell(&state.rows, cell).input.clone())
    }

    async fn display_text(&self, cell: CellRef) -> Result<String, BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("display {} ", cell));
        let c = Self::cell_mut(&mut state.rows, cell);
        if c.late_pending {
            c.late_pending = false;
            return Ok(String::new());
        }
        Ok(c.display.trim().to_string())
    }

    async fn wait_cell_visible(&self, cell: CellRef, _timeout: Duration) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("wait_cell {} ", cell));
        if state.fail_next_row_wait {
            return Err(BrowserError::Timeout(cell.to_string()));
        }
        Ok(())
    }

    async fn wait_display_visible(
        &self,
        cell: CellRef,
        _timeout: Duration,
    ) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("wait_display {} ", cell));
        if Self::cell(&state.rows, cell).display_hidden {
            return Err(BrowserError::Timeout(format!("{} display", cell)));
        }
        Ok(())
    }

    async fn click_cell(&self, cell: CellRef) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("click {} ", cell));
        let c = Self::cell_mut(&mut state.rows, cell);
        if c.failing_clicks > 0 {
            c.failing_clicks -= 1;
            return Err(BrowserError::ElementNotFound(cell.to_string()));
        }
        let initial = c.input.as_ref().map(|i| i.value.clone()).unwrap_or_default();
        state.focused = Some(cell);
        state.buffer = initial;
        Ok(())
    }

    async fn clear_focused(&self) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.calls.push("clear".to_string());
        state.buffer.clear();
        Ok(())
    }

    async fn type_slowly(&self, text: &str, _delay: Duration) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("type {}", text));
        state.buffer.push_str(text);
        Ok(())
    }

    async fn confirm(&self) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.calls.push("confirm".to_string());
        let Some(cell) = state.focused else {
            return Ok(());
        };
        let typed = state.buffer.clone();
        let c = Self::cell_mut(&mut state.rows, cell);
        match c.commit.clone() {
            Commit::Accept => c.display = typed,
            Commit::Show(text) => c.display = text,
            Commit::AcceptLate => {
                c.display = typed;
                c.late_pending = true;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct LoginState {
    calls: Vec<String>,
    /// URLs returned by successive `current_url` calls; the last one repeats.
    urls: VecDeque<String>,
    fail_dialog: bool,
    dialog_open: bool,
    /// Opens a dialog once the report table is shown.
    report_dialog: bool,
    dismissed: usize,
    fail_link: bool,
    fail_table: bool,
}

/// Login view that reports a scripted sequence of URLs.
pub struct FakeLogin {
    state: Mutex<LoginState>,
}

impl FakeLogin {
    /// Lands on the dashboard after `polls` non-dashboard URL reads.
    pub fn authenticating_after(polls: usize) -> Self {
        let mut urls: VecDeque<String> = (0..polls)
            .map(|_| "https://app.meckano.co.il/#login".to_string())
            .collect();
        urls.push_back("https://app.meckano.co.il/#dashboard".to_string());
        Self {
            state: Mutex::new(LoginState {
                urls,
                ..Default::default()
            }),
        }
    }

    /// Never reaches the dashboard.
    pub fn never_authenticating() -> Self {
        Self {
            state: Mutex::new(LoginState {
                urls: VecDeque::from(["https://app.meckano.co.il/#login".to_string()]),
                ..Default::default()
            }),
        }
    }

    pub fn with_dialog(self) -> Self {
        self.state.lock().dialog_open = true;
        self
    }

    pub fn with_report_dialog(self) -> Self {
        self.state.lock().report_dialog = true;
        self
    }

    pub fn failing_dialog(self) -> Self {
        self.state.lock().fail_dialog = true;
        self
    }

    pub fn failing_link(self) -> Self {
        self.state.lock().fail_link = true;
        self
    }

    pub fn failing_table(self) -> Self {
        self.state.lock().fail_table = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Dialogs actually closed.
    pub fn dismissed(&self) -> usize {
        self.state.lock().dismissed
    }
}

#[async_trait]
impl LoginSurface for FakeLogin {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        self.state.lock().calls.push(format!("open {}", url));
        Ok(())
    }

    async fn fill_login_field(&self, field: LoginField, value: &str) -> Result<(), BrowserError> {
        self.state
            .lock()
            .calls
            .push(format!("fill {:?} {}", field, value));
        Ok(())
    }

    async fn submit_login(&self) -> Result<(), BrowserError> {
        self.state.lock().calls.push("submit".to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let mut state = self.state.lock();
        state.calls.push("current_url".to_string());
        let url = if state.urls.len() > 1 {
            state.urls.pop_front()
        } else {
            state.urls.front().cloned()
        };
        url.ok_or(BrowserError::NotConnected)
    }

    async fn wait_for_text(&self, text: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.state.lock().calls.push(format!("wait_text {}", text));
        Ok(())
    }

    async fn click_link(&self, text: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("click_link {}", text));
        if state.fail_link {
            return Err(BrowserError::ElementNotFound(format!("link \"{}\"", text)));
        }
        Ok(())
    }

    async fn wait_for_report_table(
        &self,
        header: &str,
        _timeout: Duration,
    ) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.calls.push(format!("wait_table {}", header));
        if state.fail_table {
            return Err(BrowserError::Timeout("report table".to_string()));
        }
        if state.report_dialog {
            state.dialog_open = true;
        }
        Ok(())
    }

    async fn dismiss_dialog(&self) -> Result<bool, BrowserError> {
        let mut state = self.state.lock();
        state.calls.push("dismiss_dialog".to_string());
        if state.fail_dialog {
            return Err(BrowserError::ActionFailed("dialog vanished".to_string()));
        }
        let closed = std::mem::take(&mut state.dialog_open);
        if closed {
            state.dismissed += 1;
        }
        Ok(closed)
    }
}
