//! In-memory capture platform
//!
//! Devices are exclusive: a device with a live track cannot be acquired again
//! until that track is stopped. Every acquire and release is logged in order.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::backend::{
    CaptureConstraints, CaptureStream, MediaDeviceInfo, MediaDevices, MediaTrack, TrackKind,
};
use crate::error::{Result, SessionError};

/// Platform call recorded by the loopback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Acquire { device_id: String, track_id: String },
    Release { device_id: String, track_id: String },
    Enumerate,
}

#[derive(Debug, Clone)]
struct LoopbackDevice {
    id: String,
    kind: &'static str,
    label: String,
}

#[derive(Debug, Default)]
struct LoopbackState {
    devices: Vec<LoopbackDevice>,
    permission_denied: bool,
    granted: bool,
    /// device id -> live track id
    claims: HashMap<String, String>,
    unplugged: HashSet<String>,
    held_elsewhere: HashSet<String>,
    log: Vec<DeviceCall>,
}

#[derive(Debug, Default)]
pub struct LoopbackMediaDevices {
    state: Mutex<LoopbackState>,
}

impl LoopbackMediaDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two cameras, one microphone and one speaker
    pub fn with_default_devices() -> Self {
        Self::new()
            .with_camera("cam-front", "Front Camera")
            .with_camera("cam-usb", "USB Camera")
            .with_microphone("mic-builtin", "Built-in Microphone")
            .with_speaker("spk-builtin", "Built-in Speakers")
    }

    pub fn with_camera(self, id: &str, label: &str) -> Self {
        self.push_device(id, "videoinput", label)
    }

    pub fn with_microphone(self, id: &str, label: &str) -> Self {
        self.push_device(id, "audioinput", label)
    }

    pub fn with_speaker(self, id: &str, label: &str) -> Self {
        self.push_device(id, "audiooutput", label)
    }

    fn push_device(self, id: &str, kind: &'static str, label: &str) -> Self {
        self.state.lock().devices.push(LoopbackDevice {
            id: id.to_string(),
            kind,
            label: label.to_string(),
        });
        self
    }

    /// Refuse every capture request as if the user denied the prompt
    pub fn deny_permission(&self) {
        self.state.lock().permission_denied = true;
    }

    pub fn unplug(&self, id: &str) {
        self.state.lock().unplugged.insert(id.to_string());
    }

    /// Simulate another application holding the device
    pub fn hold_elsewhere(&self, id: &str) {
        self.state.lock().held_elsewhere.insert(id.to_string());
    }

    pub fn claimed_devices(&self) -> Vec<String> {
        let mut claimed: Vec<String> = self.state.lock().claims.keys().cloned().collect();
        claimed.sort();
        claimed
    }

    pub fn live_track_count(&self) -> usize {
        self.state.lock().claims.len()
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.lock().log.clone()
    }
}

impl LoopbackState {
    fn resolve(&self, kind: &'static str, requested: Option<&str>) -> Result<LoopbackDevice> {
        let device = match requested {
            Some(id) => self.devices.iter().find(|d| d.id == id && d.kind == kind),
            None => self.devices.iter().find(|d| d.kind == kind),
        };

        let device = device.ok_or_else(|| {
            SessionError::device_unavailable(requested.unwrap_or(kind), "no such device")
        })?;

        if self.unplugged.contains(&device.id) {
            return Err(SessionError::device_unavailable(&device.id, "device unplugged"));
        }
        if self.held_elsewhere.contains(&device.id) || self.claims.contains_key(&device.id) {
            return Err(SessionError::device_unavailable(&device.id, "device already in use"));
        }
        Ok(device.clone())
    }
}

#[async_trait::async_trait]
impl MediaDevices for LoopbackMediaDevices {
    async fn get_user_media(&self, constraints: &CaptureConstraints) -> Result<CaptureStream> {
        let mut state = self.state.lock();

        if state.permission_denied {
            return Err(SessionError::PermissionDenied(
                "camera/microphone access was denied".to_string(),
            ));
        }

        // Resolve everything before claiming anything
        let mut wanted = Vec::new();
        if let Some(video) = &constraints.video {
            wanted.push((TrackKind::Video, state.resolve("videoinput", video.device_id.as_deref())?));
        }
        if let Some(audio) = &constraints.audio {
            wanted.push((TrackKind::Audio, state.resolve("audioinput", audio.device_id.as_deref())?));
        }

        state.granted = true;

        let mut tracks = Vec::with_capacity(wanted.len());
        for (kind, device) in wanted {
            let track_id = format!("track-{}", uuid::Uuid::new_v4());
            state.claims.insert(device.id.clone(), track_id.clone());
            state.log.push(DeviceCall::Acquire {
                device_id: device.id.clone(),
                track_id: track_id.clone(),
            });
            debug!("Loopback acquired {} as {}", device.id, track_id);
            tracks.push(MediaTrack {
                id: track_id,
                kind,
                device_id: device.id,
                label: device.label,
            });
        }

        Ok(CaptureStream::new(format!("stream-{}", uuid::Uuid::new_v4()), tracks))
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>> {
        let mut state = self.state.lock();
        state.log.push(DeviceCall::Enumerate);

        if state.permission_denied {
            return Err(SessionError::PermissionDenied(
                "device enumeration was blocked".to_string(),
            ));
        }

        let granted = state.granted;
        Ok(state
            .devices
            .iter()
            .map(|d| MediaDeviceInfo {
                device_id: d.id.clone(),
                kind: d.kind.to_string(),
                label: if granted { d.label.clone() } else { String::new() },
            })
            .collect())
    }

    fn stop_track(&self, track: &MediaTrack) {
        let mut state = self.state.lock();
        let owned = state
            .claims
            .get(&track.device_id)
            .is_some_and(|id| *id == track.id);
        if owned {
            state.claims.remove(&track.device_id);
            state.log.push(DeviceCall::Release {
                device_id: track.device_id.clone(),
                track_id: track.id.clone(),
            });
            debug!("Loopback released {}", track.device_id);
        }
    }

    fn name(&self) -> &str {
        "loopback"
    }
}
