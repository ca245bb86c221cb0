// Tests for the local capture session
//
// The loopback platform claims devices exclusively and logs every acquire and
// release, so ordering and leaks are observable.

use ivs_studio::media::{
    CaptureProfile, DeviceCall, LocalMediaSession, LoopbackMediaDevices, TrackKind,
};
use ivs_studio::SessionError;
use std::sync::Arc;

fn session() -> (Arc<LoopbackMediaDevices>, LocalMediaSession) {
    let platform = Arc::new(LoopbackMediaDevices::with_default_devices());
    let local = LocalMediaSession::new(platform.clone(), CaptureProfile::stage());
    (platform, local)
}

fn position(calls: &[DeviceCall], wanted: impl Fn(&DeviceCall) -> bool) -> usize {
    calls.iter().position(wanted).expect("call not found")
}

#[tokio::test]
async fn test_start_uses_default_devices() {
    let (platform, mut local) = session();

    let stream = local.start(None, None).await.unwrap();

    assert_eq!(stream.device_for(TrackKind::Video), Some("cam-front"));
    assert_eq!(stream.device_for(TrackKind::Audio), Some("mic-builtin"));
    assert_eq!(platform.claimed_devices(), vec!["cam-front", "mic-builtin"]);
}

#[tokio::test]
async fn test_switch_releases_before_acquiring() {
    let (platform, mut local) = session();
    local.start(Some("cam-front"), None).await.unwrap();

    local.switch_device(Some("cam-usb"), None).await.unwrap();

    let calls = platform.calls();
    let released_front = position(&calls, |c| {
        matches!(c, DeviceCall::Release { device_id, .. } if device_id == "cam-front")
    });
    let released_mic = position(&calls, |c| {
        matches!(c, DeviceCall::Release { device_id, .. } if device_id == "mic-builtin")
    });
    let acquired_usb = position(&calls, |c| {
        matches!(c, DeviceCall::Acquire { device_id, .. } if device_id == "cam-usb")
    });
    assert!(released_front < acquired_usb);
    assert!(released_mic < acquired_usb);
    assert_eq!(platform.claimed_devices(), vec!["cam-usb", "mic-builtin"]);
}

#[tokio::test]
async fn test_repeated_switches_never_double_claim() {
    let (platform, mut local) = session();
    local.start(None, None).await.unwrap();

    for camera in ["cam-usb", "cam-front", "cam-usb", "cam-front"] {
        local.switch_device(Some(camera), None).await.unwrap();
        assert_eq!(platform.live_track_count(), 2);
        assert_eq!(
            local.current().and_then(|s| s.device_for(TrackKind::Video)),
            Some(camera)
        );
    }
}

#[tokio::test]
async fn test_failed_switch_restores_previous_devices() {
    let (platform, mut local) = session();
    local.start(Some("cam-front"), None).await.unwrap();
    platform.unplug("cam-usb");

    let err = local.switch_device(Some("cam-usb"), None).await.unwrap_err();

    assert!(matches!(err, SessionError::DeviceUnavailable { .. }));
    assert!(err.is_recoverable());
    let current = local.current().unwrap();
    assert_eq!(current.device_for(TrackKind::Video), Some("cam-front"));
    assert_eq!(platform.claimed_devices(), vec!["cam-front", "mic-builtin"]);
}

#[tokio::test]
async fn test_device_held_elsewhere_is_unavailable() {
    let (platform, mut local) = session();
    platform.hold_elsewhere("cam-front");

    let err = local.start(Some("cam-front"), None).await.unwrap_err();

    assert!(matches!(err, SessionError::DeviceUnavailable { .. }));
    assert!(local.current().is_none());
    assert_eq!(platform.live_track_count(), 0);
}

#[tokio::test]
async fn test_permission_denied_on_start() {
    let (platform, mut local) = session();
    platform.deny_permission();

    let err = local.start(None, None).await.unwrap_err();

    assert!(matches!(err, SessionError::PermissionDenied(_)));
    assert!(!local.preview().is_bound());
}

#[tokio::test]
async fn test_preview_rebinds_without_new_surface() {
    let (_platform, mut local) = session();
    local.start(None, None).await.unwrap();
    assert_eq!(local.preview().surfaces_created(), 1);
    assert_eq!(local.preview().rebinds(), 0);

    local.switch_device(Some("cam-usb"), None).await.unwrap();

    let preview = local.preview();
    assert_eq!(preview.surfaces_created(), 1);
    assert_eq!(preview.rebinds(), 1);
    let ids: Vec<String> = local.tracks().into_iter().map(|t| t.id).collect();
    assert_eq!(preview.track_ids(), ids.as_slice());
}

#[tokio::test]
async fn test_stop_releases_tracks_and_unbinds_preview() {
    let (platform, mut local) = session();
    local.start(None, None).await.unwrap();

    local.stop();

    assert_eq!(platform.live_track_count(), 0);
    assert!(!local.preview().is_bound());
    assert!(local.tracks().is_empty());
}

#[tokio::test]
async fn test_drop_releases_tracks() {
    let (platform, mut local) = session();
    local.start(None, None).await.unwrap();
    assert_eq!(platform.live_track_count(), 2);

    drop(local);

    assert_eq!(platform.live_track_count(), 0);
}
