//! Login and navigation up to the monthly report table.

use std::time::Duration;

use hourfill_config::{Credentials, PortalConfig, TimeoutConfig};
use secrecy::ExposeSecret;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{FillError, Result};
use crate::portal::{LoginField, LoginSurface};

/// Text the portal shows at each step.
pub mod markers {
    /// URL fragment of the authenticated landing view.
    pub const DASHBOARD_FRAGMENT: &str = "#dashboard";
    /// Label of the clock-in button on the landing view.
    pub const LANDING_TEXT: &str = "כפתור כניסה";
    /// Text of the monthly report link.
    pub const REPORT_LINK: &str = "דוח חודשי";
    /// Header of the report's date column.
    pub const DATE_HEADER: &str = "תאריך";
}

/// How often the page URL is checked while waiting for login to complete.
pub const LOGIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Takes a fresh page from the login view to the monthly report.
pub struct SessionBootstrap<'a, P: LoginSurface + ?Sized> {
    surface: &'a P,
    portal: &'a PortalConfig,
    credentials: &'a Credentials,
    timeouts: &'a TimeoutConfig,
}

impl<'a, P: LoginSurface + ?Sized> SessionBootstrap<'a, P> {
    pub fn new(
        surface: &'a P,
        portal: &'a PortalConfig,
        credentials: &'a Credentials,
        timeouts: &'a TimeoutConfig,
    ) -> Self {
        Self {
            surface,
            portal,
            credentials,
            timeouts,
        }
    }

    /// Log in and open the report. Every failure here is fatal.
    pub async fn run(&self) -> Result<()> {
        self.login().await?;
        self.wait_until_authenticated().await?;
        self.open_report().await?;
        info!("Monthly report ready");
        Ok(())
    }

    async fn login(&self) -> Result<()> {
        let s = self.surface;
        info!(url = %self.portal.base_url, "Opening portal");
        s.open(&self.portal.base_url)
            .await
            .map_err(|e| FillError::navigation("open portal", e))?;

        s.fill_login_field(LoginField::Identifier, &self.credentials.email)
            .await
            .map_err(|e| FillError::navigation("identifier field", e))?;
        s.fill_login_field(LoginField::Secret, self.credentials.password.expose_secret())
            .await
            .map_err(|e| FillError::navigation("password field", e))?;
        s.submit_login()
            .await
            .map_err(|e| FillError::navigation("submit login", e))?;

        info!(
            budget = ?self.timeouts.login(),
            "Login submitted, waiting for dashboard (complete any verification step in the browser)"
        );
        Ok(())
    }

    /// Poll the URL for the dashboard fragment. A second factor is completed
    /// by hand in the browser inside this window.
    async fn wait_until_authenticated(&self) -> Result<()> {
        let budget = self.timeouts.login();
        let deadline = Instant::now() + budget;

        loop {
            match self.surface.current_url().await {
                Ok(url) if url.contains(markers::DASHBOARD_FRAGMENT) => {
                    info!("Authenticated");
                    return Ok(());
                }
                Ok(url) => debug!(url = %url, "Not on dashboard yet"),
                Err(e) => debug!(error = %e, "Could not read page URL"),
            }

            if Instant::now() >= deadline {
                return Err(FillError::AuthenticationTimeout(budget));
            }
            tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
        }
    }

    async fn open_report(&self) -> Result<()> {
        let s = self.surface;

        s.wait_for_text(markers::LANDING_TEXT, self.timeouts.navigation())
            .await
            .map_err(|e| FillError::navigation("landing view", e))?;

        self.dismiss_dialog("landing").await;

        s.click_link(markers::REPORT_LINK)
            .await
            .map_err(|e| FillError::navigation("monthly report link", e))?;
        s.wait_for_report_table(markers::DATE_HEADER, self.timeouts.element())
            .await
            .map_err(|e| FillError::navigation("report table", e))?;

        self.dismiss_dialog("report").await;
        Ok(())
    }

    /// Close a blocking dialog if one is showing. Never fails the run.
    async fn dismiss_dialog(&self, view: &str) {
        match self.surface.dismiss_dialog().await {
            Ok(true) => info!(view, "Dismissed a blocking dialog"),
            Ok(false) => debug!(view, "No dialog to dismiss"),
            Err(e) => warn!(view, error = %e, "Could not dismiss dialog, continuing"),
        }
    }
}
