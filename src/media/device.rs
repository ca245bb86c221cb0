//! Camera / microphone enumeration and selection

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::backend::{MediaDeviceInfo, MediaDevices};
use crate::error::{Result, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Camera,
    Microphone,
}

impl DeviceKind {
    /// Map a platform kind string; output devices and anything else are ignored
    pub fn from_platform(kind: &str) -> Option<Self> {
        match kind {
            "videoinput" => Some(DeviceKind::Camera),
            "audioinput" => Some(DeviceKind::Microphone),
            _ => None,
        }
    }
}

/// Capture device as listed by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub kind: DeviceKind,
    pub label: String,
}

impl DeviceDescriptor {
    fn from_platform(info: MediaDeviceInfo) -> Option<Self> {
        let kind = DeviceKind::from_platform(&info.kind)?;
        Some(Self {
            id: info.device_id,
            kind,
            label: info.label,
        })
    }

    /// Label for display, with a generic fallback for unlabelled devices
    pub fn display_label(&self) -> &str {
        if !self.label.is_empty() {
            return &self.label;
        }
        match self.kind {
            DeviceKind::Camera => "Camera",
            DeviceKind::Microphone => "Microphone",
        }
    }
}

/// Device lists plus current selection, as handed to the rendering surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLists {
    pub cameras: Vec<DeviceDescriptor>,
    pub microphones: Vec<DeviceDescriptor>,
    pub selected_camera: Option<String>,
    pub selected_microphone: Option<String>,
}

/// Tracks the available capture devices and which ones are selected
///
/// Lists are replaced wholesale on every enumeration. Labels are usually
/// blank until a capture grant exists, so callers capture first and
/// enumerate afterwards.
pub struct DeviceRegistry {
    platform: Arc<dyn MediaDevices>,
    cameras: Vec<DeviceDescriptor>,
    microphones: Vec<DeviceDescriptor>,
    selected_camera: Option<String>,
    selected_microphone: Option<String>,
}

impl DeviceRegistry {
    pub fn new(platform: Arc<dyn MediaDevices>) -> Self {
        Self {
            platform,
            cameras: Vec::new(),
            microphones: Vec::new(),
            selected_camera: None,
            selected_microphone: None,
        }
    }

    /// Re-enumerate devices and refresh the default selection
    pub async fn list_devices(&mut self) -> Result<DeviceLists> {
        let devices = self.platform.enumerate_devices().await?;

        let mut cameras = Vec::new();
        let mut microphones = Vec::new();
        for device in devices.into_iter().filter_map(DeviceDescriptor::from_platform) {
            match device.kind {
                DeviceKind::Camera => cameras.push(device),
                DeviceKind::Microphone => microphones.push(device),
            }
        }

        info!(
            "Enumerated {} camera(s), {} microphone(s) via {}",
            cameras.len(),
            microphones.len(),
            self.platform.name()
        );

        self.selected_camera = keep_or_first(self.selected_camera.take(), &cameras);
        self.selected_microphone = keep_or_first(self.selected_microphone.take(), &microphones);
        self.cameras = cameras;
        self.microphones = microphones;

        Ok(self.lists())
    }

    pub fn lists(&self) -> DeviceLists {
        DeviceLists {
            cameras: self.cameras.clone(),
            microphones: self.microphones.clone(),
            selected_camera: self.selected_camera.clone(),
            selected_microphone: self.selected_microphone.clone(),
        }
    }

    pub fn cameras(&self) -> &[DeviceDescriptor] {
        &self.cameras
    }

    pub fn microphones(&self) -> &[DeviceDescriptor] {
        &self.microphones
    }

    pub fn selected_camera(&self) -> Option<&str> {
        self.selected_camera.as_deref()
    }

    pub fn selected_microphone(&self) -> Option<&str> {
        self.selected_microphone.as_deref()
    }

    pub fn select_camera(&mut self, id: &str) -> Result<()> {
        ensure_listed(id, &self.cameras)?;
        debug!("Selected camera {}", id);
        self.selected_camera = Some(id.to_string());
        Ok(())
    }

    pub fn select_microphone(&mut self, id: &str) -> Result<()> {
        ensure_listed(id, &self.microphones)?;
        debug!("Selected microphone {}", id);
        self.selected_microphone = Some(id.to_string());
        Ok(())
    }
}

fn keep_or_first(previous: Option<String>, devices: &[DeviceDescriptor]) -> Option<String> {
    match previous {
        Some(id) if devices.iter().any(|d| d.id == id) => Some(id),
        _ => devices.first().map(|d| d.id.clone()),
    }
}

fn ensure_listed(id: &str, devices: &[DeviceDescriptor]) -> Result<()> {
    if devices.iter().any(|d| d.id == id) {
        Ok(())
    } else {
        Err(SessionError::device_unavailable(id, "device is not in the current device list"))
    }
}
