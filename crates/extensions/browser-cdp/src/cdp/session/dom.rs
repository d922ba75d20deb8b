//! DOM operations for CDP page session.

use crate::cdp::error::CdpError;
use crate::cdp::protocol::ElementRect;

use super::core::PageSession;

impl PageSession {
    /// Click the element an expression evaluates to.
    ///
    /// `element_expr` is a JavaScript expression yielding an `Element` or
    /// `null`. The element is scrolled into view and clicked at its centre
    /// with real mouse events.
    pub async fn click_element(&self, element_expr: &str, what: &str) -> Result<(), CdpError> {
        let script = format!(
            r#"(() => {{
                const el = ({element_expr});
                if (!el) return null;
                el.scrollIntoView({{block: "center", inline: "center"}});
                const r = el.getBoundingClientRect();
                return {{x: r.x, y: r.y, width: r.width, height: r.height}};
            }})()"#
        );

        let value = self.evaluate(&script).await?;
        if value.is_null() {
            return Err(CdpError::ElementNotFound(what.to_string()));
        }

        let rect: ElementRect = serde_json::from_value(value)?;
        if rect.is_empty() {
            return Err(CdpError::ElementNotFound(format!("{} (not visible)", what)));
        }

        let (x, y) = rect.center();
        self.click(x, y).await
    }
}
