use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Page.navigate".to_string(),
        params: Some(serde_json::json!({"url": "https://app.meckano.co.il"})),
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Page.navigate"));
    assert!(json.contains("\"sessionId\":\"S1\""));
}

#[test]
fn test_cdp_request_omits_empty_fields() {
    let req = CdpRequest {
        id: 7,
        method: "Target.getTargets".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert_eq!(json, r#"{"id":7,"method":"Target.getTargets"}"#);
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"frameId": "abc"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
    assert!(resp.error.is_none());
}

#[test]
fn test_cdp_event_deserialize() {
    let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}, "sessionId": "S1"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, None);
    assert_eq!(resp.method.as_deref(), Some("Page.loadEventFired"));
    assert_eq!(resp.session_id.as_deref(), Some("S1"));
}

#[test]
fn test_cdp_error_deserialize() {
    let json = r#"{"id": 3, "error": {"code": -32000, "message": "Could not find node"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    let error = resp.error.unwrap();
    assert_eq!(error.code, -32000);
    assert_eq!(error.message, "Could not find node");
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/126.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.protocol_version, "1.3");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Meckano",
        "url": "https://app.meckano.co.il",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert_eq!(info.page_type, "page");
}

#[test]
fn test_mouse_button_serialize() {
    let json = serde_json::to_string(&MouseButton::Left).unwrap();
    assert_eq!(json, "\"left\"");
}

#[test]
fn test_key_event_type_serialize() {
    let json = serde_json::to_string(&KeyEventType::KeyDown).unwrap();
    assert_eq!(json, "\"keyDown\"");
}

#[test]
fn test_device_metrics_serialize() {
    let metrics = DeviceMetrics {
        width: 1280,
        height: 720,
        device_scale_factor: 1.0,
        mobile: false,
    };
    let json = serde_json::to_value(&metrics).unwrap();
    assert_eq!(json["deviceScaleFactor"], 1.0);
    assert_eq!(json["width"], 1280);
}

#[test]
fn test_element_rect_center() {
    let rect = ElementRect {
        x: 10.0,
        y: 20.0,
        width: 100.0,
        height: 40.0,
    };
    assert_eq!(rect.center(), (60.0, 40.0));
    assert!(!rect.is_empty());
}

#[test]
fn test_key_definition_lookup() {
    let enter = KeyDefinition::lookup("Enter").unwrap();
    assert_eq!(enter.key_code, 13);
    assert_eq!(enter.text, Some("\r"));

    let backspace = KeyDefinition::lookup("Backspace").unwrap();
    assert_eq!(backspace.key_code, 8);
    assert!(backspace.text.is_none());

    assert!(KeyDefinition::lookup("F13").is_none());
}
