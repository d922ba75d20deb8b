//! hourfill - fill missing times in the Meckano monthly report
//!
//! Main entry point: configuration, tracing, and the browser run.

mod cli;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hourfill_browser::{BrowserManager, BrowserManagerConfig};
use hourfill_config::{BrowserConfig, ConfigLoader, FillerConfig};
use hourfill_core::{CdpPortal, FillError, RowLoop, RunSummary, SessionBootstrap};

use cli::Cli;

/// hourfill home directory (`~/.hourfill`).
fn hourfill_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hourfill")
}

/// Initialize tracing with file and console output.
fn init_tracing(log_level: Option<&str>) -> anyhow::Result<()> {
    let log_dir = hourfill_dir().join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("hourfill")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log filter '{}'", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn browser_manager_config(browser: &BrowserConfig) -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: browser.debug_port,
        viewport_width: browser.viewport_width,
        viewport_height: browser.viewport_height,
        profile_dir: Some(browser.resolved_profile_dir()),
        headless: browser.headless,
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Loaded before tracing so RUST_LOG can come from the file.
    let env_file = ConfigLoader::load_env_file(cli.env_file.as_deref())?;
    init_tracing(cli.log_level.as_deref())?;

    info!("Starting hourfill v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    let config = ConfigLoader::load_with_overrides(cli.config.as_deref(), &cli.overrides())
        .map_err(FillError::from)?;
    for warning in &config.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }

    let manager = BrowserManager::new(browser_manager_config(&config.browser));
    let budget = config.timeouts.run();

    let outcome = tokio::select! {
        result = tokio::time::timeout(budget, fill(&manager, &config)) => {
            Some(result.unwrap_or(Err(FillError::RunTimeout(budget))))
        }
        _ = tokio::signal::ctrl_c() => None,
    };

    if let Err(e) = manager.shutdown_chrome().await {
        warn!("Chrome shutdown failed: {}", e);
    }

    match outcome {
        Some(Ok(summary)) if summary.is_noop() => {
            info!("Nothing to fill: {}", summary);
            Ok(())
        }
        Some(Ok(summary)) => {
            info!("Filled missing times: {}", summary);
            Ok(())
        }
        Some(Err(e)) => {
            error!("Run failed: {}", e);
            Err(e.into())
        }
        None => {
            warn!("Interrupted");
            anyhow::bail!("interrupted before the run finished")
        }
    }
}

/// Open the portal, log in, and fill every row.
async fn fill(manager: &BrowserManager, config: &FillerConfig) -> Result<RunSummary, FillError> {
    let page = manager.open_page().await?;
    let portal = CdpPortal::new(page);

    SessionBootstrap::new(&portal, &config.portal, &config.credentials, &config.timeouts)
        .run()
        .await?;

    RowLoop::new(&portal, &config.time, StdRng::from_entropy())
        .run()
        .await
}
