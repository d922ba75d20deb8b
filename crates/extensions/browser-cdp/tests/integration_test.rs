//! Integration tests against a real Chrome.
//!
//! These tests require Chrome to be installed on the system.
//! Run with: cargo test -p hourfill-browser --test integration_test -- --ignored --nocapture

use std::time::Duration;

use hourfill_browser::cdp::js_string;
use hourfill_browser::manager::{BrowserManager, BrowserManagerConfig};

fn test_config() -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: 9333, // Use different port to avoid conflicts
        profile_dir: Some(std::path::PathBuf::from("/tmp/hourfill-test-profile")),
        headless: true,
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_connect_and_shutdown() {
    let manager = BrowserManager::new(test_config());

    let result = manager.connect().await;
    assert!(result.is_ok(), "Connection should succeed: {:?}", result.err());

    assert!(manager.shutdown_chrome().await.is_ok());
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_open_page_type_and_read_back() {
    let manager = BrowserManager::new(test_config());
    let page = manager.open_page().await.expect("open page");

    let html = "<input id='t'><span id='s'>ready</span>";
    page.navigate(&format!("data:text/html,{}", html))
        .await
        .expect("navigate");
    page.wait_for_function(
        "document.querySelector('#t') !== null",
        Duration::from_secs(5),
        "input",
    )
    .await
    .expect("input present");

    page.click_element("document.querySelector('#t')", "input")
        .await
        .expect("click input");
    page.type_text_with_delay("08:15", Duration::from_millis(10))
        .await
        .expect("type");

    let value: String = page
        .evaluate_as("document.querySelector('#t').value")
        .await
        .expect("read value");
    assert_eq!(value, "08:15");

    page.press_key_combo("Control+a").await.expect("select all");
    page.press_key("Backspace").await.expect("clear");
    let cleared: String = page
        .evaluate_as("document.querySelector('#t').value")
        .await
        .expect("read value");
    assert!(cleared.is_empty());

    page.click_element("document.querySelector('#s')", "span")
        .await
        .expect("click span");
    let span: String = page
        .evaluate_as(&format!("document.querySelector({}).textContent", js_string("#s")))
        .await
        .expect("read span");
    assert_eq!(span, "ready");

    manager.close_page(&page).await.expect("close page");
    manager.shutdown_chrome().await.expect("shutdown");
}
