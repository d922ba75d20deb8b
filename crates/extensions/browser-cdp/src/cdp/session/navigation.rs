//! Navigation and waiting operations for CDP page session.

use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

/// Interval between polls in the `wait_*` helpers.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default budget for `wait_for_load`.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

impl PageSession {
    /// Navigate to URL and wait for the document to become interactive.
    pub async fn navigate(&self, url: &str) -> Result<String, CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText") {
            return Err(CdpError::NavigationFailed(
                error.as_str().unwrap_or("Unknown error").to_string(),
            ));
        }

        let frame_id = result["frameId"]
            .as_str()
            .unwrap_or("main")
            .to_string();

        self.wait_for_load().await?;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Wait for page load.
    pub async fn wait_for_load(&self) -> Result<(), CdpError> {
        let start = Instant::now();

        loop {
            // The document may be swapped out mid-poll; treat that as not ready.
            if let Ok(result) = self.evaluate("document.readyState").await {
                if let Some(state) = result.as_str() {
                    if state == "complete" || state == "interactive" {
                        return Ok(());
                    }
                }
            }

            if start.elapsed() > LOAD_TIMEOUT {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Get current URL.
    pub async fn get_url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Poll a JavaScript expression until it evaluates to `true`.
    ///
    /// Evaluation errors while polling (a navigation in flight, a node
    /// detached by a re-render) count as "not yet"; only the deadline fails.
    pub async fn wait_for_function(
        &self,
        expression: &str,
        timeout: Duration,
        what: &str,
    ) -> Result<(), CdpError> {
        let start = Instant::now();

        loop {
            if let Ok(value) = self.evaluate(expression).await {
                if value.as_bool() == Some(true) {
                    return Ok(());
                }
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout(format!(
                    "Waiting for {} timed out after {:?}",
                    what, timeout
                )));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
