//! [`LoginSurface`] and [`ReportTable`] over a live Chrome page.
//!
//! Every call builds a small script that locates its element from the
//! document root, so nothing is cached between calls.

use std::time::Duration;

use async_trait::async_trait;
use hourfill_browser::{BrowserError, PageSession, cdp::js_string};
use tracing::debug;

use crate::portal::{CellRef, InputProbe, LoginField, LoginSurface, ReportTable};

/// Rows of the monthly report.
pub const ROWS_SELECTOR: &str = "#mainview > div > table > tbody > tr";
/// The report table itself.
pub const TABLE_SELECTOR: &str = "#mainview > div > table";
/// Path from the date cell to its label.
pub const DATE_LABEL_SELECTOR: &str = "span div div p";

const IDENTIFIER_SELECTORS: &[&str] = &[
    "input[type=email]",
    "input[autocomplete=username]",
    "input[name=email]",
    "#email",
];
const IDENTIFIER_LABELS: &[&str] = &["אימייל", "דוא\"ל", "email", "Email"];

const SECRET_SELECTORS: &[&str] = &[
    "input[type=password]",
    "input[name=password]",
    "#password",
];
const SECRET_LABELS: &[&str] = &["סיסמה", "password", "Password"];

const SUBMIT_SELECTORS: &[&str] = &[
    "button[type=submit]",
    "input[type=submit]",
    "#submitButtons input",
    "#submitButtons button",
    "#submitButtons",
];

const DIALOG_SELECTORS: &[&str] = &["[role=dialog]", ".modal.show", ".modal.in", ".ui-dialog"];
const DIALOG_CLOSE_SELECTORS: &[&str] = &[
    "[data-dismiss=modal]",
    "[data-bs-dismiss=modal]",
    "[aria-label=Close]",
    ".btn-close",
    ".close",
    ".ui-dialog-titlebar-close",
];

/// Shared JS helper: rendered and not hidden.
const VISIBLE_FN: &str = "(el) => !!el && el.getClientRects().length > 0 \
    && getComputedStyle(el).visibility !== 'hidden'";

/// JS array literal of CSS selectors.
fn js_selectors(selectors: &[&str]) -> String {
    let items: Vec<String> = selectors.iter().map(|s| js_string(s)).collect();
    format!("[{}]", items.join(", "))
}

/// JS expression: first visible match of any selector, or `null`.
fn first_visible_expr(selectors: &[&str]) -> String {
    format!(
        "(() => {{ const visible = {VISIBLE_FN}; \
         for (const sel of {list}) {{ \
           for (const el of document.querySelectorAll(sel)) {{ if (visible(el)) return el; }} \
         }} return null; }})()",
        list = js_selectors(selectors)
    )
}

/// JS expression: the control of a login field, by type/name/id, then by the
/// text of its `<label>` or `aria-label`.
fn login_field_expr(field: LoginField) -> String {
    let (selectors, labels) = match field {
        LoginField::Identifier => (IDENTIFIER_SELECTORS, IDENTIFIER_LABELS),
        LoginField::Secret => (SECRET_SELECTORS, SECRET_LABELS),
    };
    format!(
        "(() => {{ const visible = {VISIBLE_FN}; \
         const direct = {direct}; if (direct) return direct; \
         const hints = {hints}; \
         for (const label of document.querySelectorAll('label')) {{ \
           const text = label.textContent || ''; \
           if (hints.some(h => text.includes(h)) && label.control && visible(label.control)) return label.control; \
         }} \
         for (const el of document.querySelectorAll('input[aria-label]')) {{ \
           const text = el.getAttribute('aria-label') || ''; \
           if (hints.some(h => text.includes(h)) && visible(el)) return el; \
         }} return null; }})()",
        direct = first_visible_expr(selectors),
        hints = js_selectors(labels),
    )
}

fn row_expr(row: usize) -> String {
    format!(
        "(document.querySelectorAll({})[{}] || null)",
        js_string(ROWS_SELECTOR),
        row
    )
}

/// JS expression: the `td` a cell lives in, or `null`.
fn cell_expr(cell: CellRef) -> String {
    format!(
        "(() => {{ const r = {row}; return r ? (r.querySelectorAll(':scope > td')[{idx}] || null) : null; }})()",
        row = row_expr(cell.row),
        idx = cell.column.cell_index()
    )
}

/// JS expression: a cell's display span (its second `span`), or `null`.
fn display_span_expr(cell: CellRef) -> String {
    format!(
        "(() => {{ const c = {cell}; return c ? (c.querySelectorAll('span')[1] || null) : null; }})()",
        cell = cell_expr(cell)
    )
}

fn visible_check(element_expr: &str) -> String {
    format!("(() => {{ const visible = {VISIBLE_FN}; return visible({element_expr}); }})()")
}

/// The portal, driven through one CDP page.
pub struct CdpPortal {
    page: PageSession,
}

impl CdpPortal {
    pub fn new(page: PageSession) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &PageSession {
        &self.page
    }

    async fn wait_until(
        &self,
        expression: &str,
        timeout: Duration,
        what: &str,
    ) -> Result<(), BrowserError> {
        self.page
            .wait_for_function(expression, timeout, what)
            .await
            .map_err(BrowserError::from)
    }
}

#[async_trait]
impl LoginSurface for CdpPortal {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        self.page.navigate(url).await?;
        Ok(())
    }

    async fn fill_login_field(&self, field: LoginField, value: &str) -> Result<(), BrowserError> {
        let what = match field {
            LoginField::Identifier => "identifier field",
            LoginField::Secret => "password field",
        };
        self.page.click_element(&login_field_expr(field), what).await?;
        self.page.press_key_combo("Control+a").await?;
        self.page.press_key("Backspace").await?;
        self.page.type_text(value).await?;
        debug!("Filled {}", what);
        Ok(())
    }

    async fn submit_login(&self) -> Result<(), BrowserError> {
        self.page
            .click_element(&first_visible_expr(SUBMIT_SELECTORS), "login submit control")
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.page.get_url().await?)
    }

    async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<(), BrowserError> {
        let script = format!(
            "(() => {{ const visible = {VISIBLE_FN}; const t = {text}; \
             if (!document.body) return false; \
             const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_ELEMENT); \
             let n; while ((n = walker.nextNode())) {{ \
               if ((n.textContent || '').trim() === t && visible(n)) return true; \
             }} return false; }})()",
            text = js_string(text)
        );
        self.wait_until(&script, timeout, &format!("text \"{}\"", text)).await
    }

    async fn click_link(&self, text: &str) -> Result<(), BrowserError> {
        let expr = format!(
            "(() => {{ const visible = {VISIBLE_FN}; const t = {text}; \
             return Array.from(document.querySelectorAll('a')) \
               .find(a => (a.textContent || '').includes(t) && visible(a)) || null; }})()",
            text = js_string(text)
        );
        self.page
            .click_element(&expr, &format!("link \"{}\"", text))
            .await?;
        Ok(())
    }

    async fn wait_for_report_table(
        &self,
        header: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let script = format!(
            "(() => {{ const visible = {VISIBLE_FN}; const h = {header}; \
             const table = document.querySelector({table}); \
             if (!visible(table)) return false; \
             return Array.from(document.querySelectorAll('th, td')) \
               .some(c => (c.textContent || '').includes(h) \
                 && Array.from(c.querySelectorAll('span')).some(visible)); }})()",
            header = js_string(header),
            table = js_string(TABLE_SELECTOR),
        );
        self.wait_until(&script, timeout, "report table").await
    }

    async fn dismiss_dialog(&self) -> Result<bool, BrowserError> {
        let dialog = first_visible_expr(DIALOG_SELECTORS);
        let open: bool = self
            .page
            .evaluate_as(&format!("{} !== null", dialog))
            .await?;
        if !open {
            return Ok(false);
        }

        let close = format!(
            "(() => {{ const visible = {VISIBLE_FN}; const d = {dialog}; if (!d) return null; \
             for (const sel of {list}) {{ \
               const b = d.querySelector(sel); if (visible(b)) return b; \
             }} return null; }})()",
            list = js_selectors(DIALOG_CLOSE_SELECTORS)
        );
        match self.page.click_element(&close, "dialog close button").await {
            Ok(()) => Ok(true),
            Err(e) => {
                debug!("No close button ({}), pressing Escape", e);
                self.page.press_key("Escape").await?;
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl ReportTable for CdpPortal {
    async fn row_count(&self) -> Result<usize, BrowserError> {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_string(ROWS_SELECTOR)
        );
        Ok(self.page.evaluate_as(&script).await?)
    }

    async fn cell_count(&self, row: usize) -> Result<usize, BrowserError> {
        let script = format!(
            "(() => {{ const r = {}; return r ? r.querySelectorAll(':scope > td').length : 0; }})()",
            row_expr(row)
        );
        Ok(self.page.evaluate_as(&script).await?)
    }

    async fn date_label(&self, row: usize) -> Result<String, BrowserError> {
        let script = format!(
            "(() => {{ const r = {row}; if (!r) return ''; \
             const c = r.querySelectorAll(':scope > td')[1]; if (!c) return ''; \
             const p = c.querySelector({label}); \
             return p ? (p.textContent || '').trim() : ''; }})()",
            row = row_expr(row),
            label = js_string(DATE_LABEL_SELECTOR),
        );
        Ok(self.page.evaluate_as(&script).await?)
    }

    async fn probe_input(&self, cell: CellRef) -> Result<Option<InputProbe>, BrowserError> {
        let script = format!(
            "(() => {{ const visible = {VISIBLE_FN}; const c = {cell}; if (!c) return null; \
             const i = c.querySelector('input'); if (!i) return null; \
             return {{ visible: visible(i), value: i.value || '' }}; }})()",
            cell = cell_expr(cell)
        );
        Ok(self.page.evaluate_as(&script).await?)
    }

    async fn display_text(&self, cell: CellRef) -> Result<String, BrowserError> {
        let script = format!(
            "(() => {{ const c = {cell}; if (!c) return null; \
             const s = c.querySelectorAll('span')[1]; \
             return s ? (s.innerText || '').trim() : ''; }})()",
            cell = cell_expr(cell)
        );
        let text: Option<String> = self.page.evaluate_as(&script).await?;
        text.ok_or_else(|| BrowserError::ElementNotFound(cell.to_string()))
    }

    async fn wait_cell_visible(&self, cell: CellRef, timeout: Duration) -> Result<(), BrowserError> {
        self.wait_until(&visible_check(&cell_expr(cell)), timeout, &cell.to_string())
            .await
    }

    async fn wait_display_visible(
        &self,
        cell: CellRef,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.wait_until(
            &visible_check(&display_span_expr(cell)),
            timeout,
            &format!("{} display", cell),
        )
        .await
    }

    async fn click_cell(&self, cell: CellRef) -> Result<(), BrowserError> {
        self.page
            .click_element(&cell_expr(cell), &cell.to_string())
            .await?;
        Ok(())
    }

    async fn clear_focused(&self) -> Result<(), BrowserError> {
        self.page.press_key_combo("Control+a").await?;
        self.page.press_key("Backspace").await?;
        Ok(())
    }

    async fn type_slowly(&self, text: &str, delay: Duration) -> Result<(), BrowserError> {
        self.page.type_text_with_delay(text, delay).await?;
        Ok(())
    }

    async fn confirm(&self) -> Result<(), BrowserError> {
        self.page.press_key("Enter").await?;
        Ok(())
    }
}
