use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Media track kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// A live track obtained from local hardware
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTrack {
    /// Platform track identifier
    pub id: String,
    pub kind: TrackKind,
    /// Hardware device the track is claiming
    pub device_id: String,
    pub label: String,
}

/// Tracks returned by one capture request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureStream {
    pub id: String,
    tracks: Vec<MediaTrack>,
}

impl CaptureStream {
    pub fn new(id: impl Into<String>, tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Video)
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Audio)
    }

    /// Device currently backing the first track of `kind`
    pub fn device_for(&self, kind: TrackKind) -> Option<&str> {
        self.tracks
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.device_id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub(crate) fn into_tracks(self) -> Vec<MediaTrack> {
        self.tracks
    }
}

/// Device record as reported by the platform, before filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    /// Platform kind string: `videoinput`, `audioinput`, `audiooutput`, ...
    pub kind: String,
    /// Empty until capture permission has been granted
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoConstraints {
    /// Exact device; `None` lets the platform pick its default camera
    pub device_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub max_frame_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioConstraints {
    pub device_id: Option<String>,
}

/// Capture request passed to the platform
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureConstraints {
    pub video: Option<VideoConstraints>,
    pub audio: Option<AudioConstraints>,
}

/// Resolution profile, fixed per use-case
///
/// Ingest already adds multi-second transport delay, so it captures at 480p
/// to keep encode latency down; stage sessions capture at 720p.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureProfile {
    pub width: u32,
    pub height: u32,
    pub max_frame_rate: u32,
    /// Upper bound handed to the vendor encoder for published video
    pub max_video_bitrate_kbps: u32,
}

impl CaptureProfile {
    pub fn ingest() -> Self {
        Self {
            width: 852,
            height: 480,
            max_frame_rate: 30,
            max_video_bitrate_kbps: 1500,
        }
    }

    pub fn stage() -> Self {
        Self {
            width: 1280,
            height: 720,
            max_frame_rate: 30,
            max_video_bitrate_kbps: 2500,
        }
    }

    pub fn constraints(&self, camera: Option<&str>, microphone: Option<&str>) -> CaptureConstraints {
        CaptureConstraints {
            video: Some(VideoConstraints {
                device_id: camera.map(str::to_string),
                width: self.width,
                height: self.height,
                max_frame_rate: self.max_frame_rate,
            }),
            audio: Some(AudioConstraints {
                device_id: microphone.map(str::to_string),
            }),
        }
    }
}

/// Platform capture capability
///
/// Implementations:
/// - Browser bridge: `getUserMedia` / `enumerateDevices`
/// - Loopback: in-memory devices (tests, demo mode)
#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    /// Acquire tracks matching `constraints`
    ///
    /// Fails with `PermissionDenied` when the user refuses capture access and
    /// with `DeviceUnavailable` when a device is unplugged or claimed elsewhere.
    async fn get_user_media(&self, constraints: &CaptureConstraints) -> Result<CaptureStream>;

    /// List every device the platform knows about
    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>>;

    /// Release the hardware claimed by `track`
    fn stop_track(&self, track: &MediaTrack);

    /// Get platform name for logging
    fn name(&self) -> &str;
}
