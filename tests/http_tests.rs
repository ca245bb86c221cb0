// Tests for the HTTP control surface
//
// Requests are driven straight into the router with `oneshot`; no socket is
// opened.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ivs_studio::vendor::LoopbackVendor;
use ivs_studio::{create_router, spawn, AppState, Config, LoopbackMediaDevices, Page, PageVariant};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn app(variant: PageVariant, cfg: Config) -> (LoopbackVendor, Router) {
    let vendor = LoopbackVendor::new();
    let devices = Arc::new(LoopbackMediaDevices::with_default_devices());
    let (page, events) = Page::new(variant, &cfg, vendor.sdk(), devices);
    let (handle, _task) = spawn(page, events);
    handle.initialize().await.unwrap();
    (vendor, create_router(AppState::new(handle)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_check() {
    let (_vendor, app) = app(PageVariant::Broadcast, Config::default()).await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_get_status() {
    let (_vendor, app) = app(PageVariant::Broadcast, Config::default()).await;

    let (code, body) = send(&app, "GET", "/status", None).await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"]["headline"], "Preview ready");
    assert_eq!(body["status"]["variant"], "broadcast");
    assert_eq!(body["status"]["error"], "");
}

#[tokio::test]
async fn test_get_devices() {
    let (_vendor, app) = app(PageVariant::StageBroadcast, Config::default()).await;

    let (code, body) = send(&app, "GET", "/devices", None).await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["devices"]["cameras"].as_array().unwrap().len(), 2);
    assert_eq!(body["devices"]["selected_camera"], "cam-front");
}

#[tokio::test]
async fn test_connect_with_blank_credentials() {
    let (vendor, app) = app(PageVariant::Broadcast, Config::default()).await;

    let (code, body) = send(&app, "POST", "/connect", Some(json!({}))).await;

    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Missing credentials"));
    assert_eq!(body["status"]["error"], body["error"]);
    assert_eq!(vendor.live_handles(), 0);
}

#[tokio::test]
async fn test_connect_and_disconnect() {
    let (vendor, app) = app(PageVariant::Broadcast, Config::default()).await;
    let credentials = json!({
        "ingest_endpoint": "rtmps://a1b2c3.global-contribute.live-video.net:443/app/",
        "stream_key": "sk_us-west-2_test",
    });

    let (code, body) = send(&app, "POST", "/connect", Some(credentials)).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"]["headline"], "Active");
    assert_eq!(body["status"]["is_live"], true);

    let (code, body) = send(&app, "POST", "/connect", Some(json!({}))).await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid state"));

    let (code, body) = send(&app, "POST", "/disconnect", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"]["headline"], "Disconnected");
    assert_eq!(vendor.live_handles(), 0);
}

#[tokio::test]
async fn test_vendor_rejection_is_bad_gateway() {
    let (vendor, app) = app(PageVariant::StageWatch, Config::default()).await;
    vendor.fail_next_start("token expired");

    let (code, body) = send(
        &app,
        "POST",
        "/connect",
        Some(json!({"participant_token": "eyJ.test"})),
    )
    .await;

    assert_eq!(code, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"]["headline"], "Failed");
}

#[tokio::test]
async fn test_select_devices() {
    let (_vendor, app) = app(PageVariant::Broadcast, Config::default()).await;

    let (code, body) = send(&app, "POST", "/devices/select", Some(json!({"camera": "cam-usb"}))).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["devices"]["selected_camera"], "cam-usb");

    let (code, _body) =
        send(&app, "POST", "/devices/select", Some(json!({"camera": "cam-missing"}))).await;
    assert_eq!(code, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_device_selection_on_viewer_page() {
    let (_vendor, app) = app(PageVariant::Watch, Config::default()).await;

    let (code, _body) = send(&app, "POST", "/devices/select", Some(json!({"camera": "cam-usb"}))).await;

    assert_eq!(code, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_playback_endpoints() {
    let mut cfg = Config::default();
    cfg.credentials.playback_url =
        "https://example.playback.live-video.net/channel.m3u8".to_string();
    let (_vendor, app) = app(PageVariant::Watch, cfg).await;

    let (code, body) = send(&app, "POST", "/connect", Some(json!({}))).await;
    assert_eq!(code, StatusCode::OK);

    let (_, body_after) = send(&app, "GET", "/status", None).await;
    assert_eq!(body_after["status"]["headline"], "Playing");
    assert_eq!(body["status"]["variant"], "watch");

    let (code, body) = send(&app, "POST", "/playback/volume", Some(json!({"volume": 0.5}))).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"]["volume"], 0.5);

    let (code, body) = send(&app, "POST", "/playback/mute", Some(json!({"muted": true}))).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"]["muted"], true);

    let (code, _body) = send(&app, "POST", "/playback/pause", None).await;
    assert_eq!(code, StatusCode::OK);
    let (_, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(body["status"]["headline"], "Idle");

    let (code, _body) = send(&app, "POST", "/playback/play", None).await;
    assert_eq!(code, StatusCode::OK);
}

#[tokio::test]
async fn test_sdk_load_failure_is_unavailable() {
    let vendor = LoopbackVendor::new();
    vendor.fail_sdk_load("script blocked");
    let devices = Arc::new(LoopbackMediaDevices::with_default_devices());
    let mut cfg = Config::default();
    cfg.credentials.ingest_endpoint = "rtmps://example/app/".to_string();
    cfg.credentials.stream_key = "sk".to_string();
    let (page, events) = Page::new(PageVariant::Broadcast, &cfg, vendor.sdk(), devices);
    let (handle, _task) = spawn(page, events);
    let _ = handle.initialize().await;
    let app = create_router(AppState::new(handle));

    let (code, body) = send(&app, "POST", "/connect", Some(json!({}))).await;

    assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"]["sdk_ready"], false);
}
