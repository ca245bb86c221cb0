// Tests for camera/microphone enumeration and selection
//
// Uses the loopback platform, which hides labels until a capture grant exists.

use ivs_studio::media::{
    CaptureProfile, DeviceKind, DeviceRegistry, LocalMediaSession, LoopbackMediaDevices,
};
use ivs_studio::SessionError;
use std::sync::Arc;

#[tokio::test]
async fn test_labels_blank_before_grant() {
    let platform = Arc::new(LoopbackMediaDevices::with_default_devices());
    let mut registry = DeviceRegistry::new(platform.clone());

    let lists = registry.list_devices().await.unwrap();

    assert_eq!(lists.cameras.len(), 2);
    assert!(lists.cameras.iter().all(|c| c.label.is_empty()));
    assert_eq!(lists.cameras[0].display_label(), "Camera");
}

#[tokio::test]
async fn test_labels_available_after_blind_capture() {
    let platform = Arc::new(LoopbackMediaDevices::with_default_devices());
    let mut local = LocalMediaSession::new(platform.clone(), CaptureProfile::ingest());
    let mut registry = DeviceRegistry::new(platform.clone());

    local.start(None, None).await.unwrap();
    let lists = registry.list_devices().await.unwrap();

    let labels: Vec<&str> = lists.cameras.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Front Camera", "USB Camera"]);
    assert_eq!(lists.microphones[0].label, "Built-in Microphone");
}

#[tokio::test]
async fn test_speakers_are_filtered_out() {
    let platform = Arc::new(LoopbackMediaDevices::with_default_devices());
    let mut registry = DeviceRegistry::new(platform);

    let lists = registry.list_devices().await.unwrap();

    assert_eq!(lists.microphones.len(), 1);
    assert!(lists.microphones.iter().all(|m| m.kind == DeviceKind::Microphone));
    assert!(!lists.microphones.iter().any(|m| m.id == "spk-builtin"));
}

#[tokio::test]
async fn test_first_device_selected_by_default() {
    let platform = Arc::new(LoopbackMediaDevices::with_default_devices());
    let mut registry = DeviceRegistry::new(platform);

    let lists = registry.list_devices().await.unwrap();

    assert_eq!(lists.selected_camera.as_deref(), Some("cam-front"));
    assert_eq!(lists.selected_microphone.as_deref(), Some("mic-builtin"));
}

#[tokio::test]
async fn test_selection_survives_reenumeration() {
    let platform = Arc::new(LoopbackMediaDevices::with_default_devices());
    let mut registry = DeviceRegistry::new(platform);

    registry.list_devices().await.unwrap();
    registry.select_camera("cam-usb").unwrap();
    let lists = registry.list_devices().await.unwrap();

    assert_eq!(lists.selected_camera.as_deref(), Some("cam-usb"));
}

#[tokio::test]
async fn test_selecting_unknown_device_fails() {
    let platform = Arc::new(LoopbackMediaDevices::with_default_devices());
    let mut registry = DeviceRegistry::new(platform);
    registry.list_devices().await.unwrap();

    let err = registry.select_camera("cam-missing").unwrap_err();

    assert!(matches!(err, SessionError::DeviceUnavailable { .. }));
    assert!(err.is_recoverable());
    assert_eq!(registry.selected_camera(), Some("cam-front"));
}

#[tokio::test]
async fn test_permission_denied() {
    let platform = Arc::new(LoopbackMediaDevices::with_default_devices());
    platform.deny_permission();
    let mut registry = DeviceRegistry::new(platform);

    let err = registry.list_devices().await.unwrap_err();

    assert!(matches!(err, SessionError::PermissionDenied(_)));
    assert!(registry.cameras().is_empty());
}
