use super::*;
use crate::cdp::CdpError;

#[test]
fn test_config_default() {
    let config = BrowserManagerConfig::default();
    assert_eq!(config.debug_port, 9222);
    assert_eq!(config.viewport_width, 1280);
    assert_eq!(config.viewport_height, 720);
    assert!(!config.headless);
}

#[test]
fn test_config_endpoint() {
    let config = BrowserManagerConfig {
        debug_port: 9333,
        ..Default::default()
    };
    assert_eq!(config.endpoint(), "http://localhost:9333");
}

#[test]
fn test_config_profile_dir() {
    let config = BrowserManagerConfig::default();
    let profile = config.get_profile_dir();
    assert!(profile.ends_with(".hourfill/browser-profile"));
}

#[test]
fn test_chrome_args() {
    let config = BrowserManagerConfig {
        profile_dir: Some(std::path::PathBuf::from("/tmp/hf-profile")),
        ..Default::default()
    };
    let args = config.chrome_args();
    assert!(args.contains(&"--remote-debugging-port=9222".to_string()));
    assert!(args.contains(&"--user-data-dir=/tmp/hf-profile".to_string()));
    assert!(args.contains(&"--window-size=1280,720".to_string()));
    assert!(!args.iter().any(|a| a.starts_with("--headless")));
}

#[test]
fn test_chrome_args_headless() {
    let config = BrowserManagerConfig {
        headless: true,
        ..Default::default()
    };
    assert!(config.chrome_args().contains(&"--headless=new".to_string()));
}

#[test]
fn test_browser_error_display() {
    let err = BrowserError::ConnectionFailed("timeout".to_string());
    assert_eq!(err.to_string(), "Connection failed: timeout");

    let err = BrowserError::ChromeNotFound;
    assert_eq!(err.to_string(), "Chrome not found. Please install Google Chrome.");

    let err = BrowserError::LaunchFailed("permission denied".to_string());
    assert_eq!(err.to_string(), "Failed to launch Chrome: permission denied");
}

#[test]
fn test_browser_error_from_cdp() {
    assert!(matches!(
        BrowserError::from(CdpError::Timeout("x".to_string())),
        BrowserError::Timeout(_)
    ));
    assert!(matches!(
        BrowserError::from(CdpError::SessionClosed),
        BrowserError::NotConnected
    ));
    assert!(matches!(
        BrowserError::from(CdpError::JavaScript("boom".to_string())),
        BrowserError::ActionFailed(msg) if msg.contains("boom")
    ));
}

#[test]
fn test_find_chrome() {
    let _result = BrowserManager::find_chrome();
}

#[tokio::test]
async fn test_close_without_connect() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(manager.close().await.is_ok());
    assert!(!manager.launched_chrome().await);
}
