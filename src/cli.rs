//! CLI definitions for hourfill.

use std::path::PathBuf;

use clap::Parser;
use hourfill_config::ConfigOverrides;

/// hourfill CLI.
#[derive(Parser, Debug)]
#[command(name = "hourfill")]
#[command(about = "Fill missing entrance/exit times in the Meckano monthly report")]
#[command(version)]
pub(crate) struct Cli {
    /// Optional TOML configuration file (environment variables override it)
    #[arg(short, long, env = "HOURFILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Environment file to load first (default: ./.env when present)
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Run Chrome without a window
    #[arg(long)]
    pub headless: bool,

    /// Chrome remote debugging port
    #[arg(long)]
    pub debug_port: Option<u16>,

    /// Chrome profile directory
    #[arg(long)]
    pub profile_dir: Option<PathBuf>,

    /// Log filter, overriding RUST_LOG (e.g. "debug" or "hourfill_core=trace")
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Flags that take precedence over the file and the environment.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            headless: self.headless.then_some(true),
            debug_port: self.debug_port,
            profile_dir: self.profile_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourfill_config::{ConfigError, ConfigLoader, FillerConfig};

    fn load(cli: &Cli) -> Result<FillerConfig, ConfigError> {
        ConfigLoader::resolve(
            None,
            |name| match name {
                "MECKANO_EMAIL" => Some("worker@example.com".to_string()),
                "MECKANO_PASSWORD" => Some("secret".to_string()),
                _ => None,
            },
            &cli.overrides(),
        )
    }

    #[test]
    fn test_defaults_leave_config_alone() {
        let cli = Cli::try_parse_from(["hourfill"]).unwrap();
        let config = load(&cli).unwrap();

        assert!(!config.browser.headless);
        assert_eq!(config.browser.debug_port, 9222);
        assert!(config.browser.profile_dir.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "hourfill",
            "--headless",
            "--debug-port",
            "9444",
            "--profile-dir",
            "/tmp/hf",
        ])
        .unwrap();
        let config = load(&cli).unwrap();

        assert!(config.browser.headless);
        assert_eq!(config.browser.debug_port, 9444);
        assert_eq!(config.browser.profile_dir, Some(PathBuf::from("/tmp/hf")));
    }

    #[test]
    fn test_zero_debug_port_is_rejected() {
        let cli = Cli::try_parse_from(["hourfill", "--debug-port", "0"]).unwrap();

        let err = load(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("browser.debug_port")));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["hourfill", "--debug-port", "70000"]).is_err());
    }
}
