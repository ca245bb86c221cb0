use std::sync::Arc;
use tracing::{info, warn};

use super::backend::{CaptureProfile, CaptureStream, MediaDevices, MediaTrack, TrackKind};
use crate::error::{Result, SessionError};

/// One-way projection of the capture session onto a preview surface
///
/// The surface is created once; later sessions only swap its source tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewBinding {
    track_ids: Vec<String>,
    surfaces_created: u32,
    rebinds: u32,
}

impl PreviewBinding {
    fn bind(&mut self, stream: &CaptureStream) {
        if self.surfaces_created == 0 {
            self.surfaces_created = 1;
        } else {
            self.rebinds += 1;
        }
        self.track_ids = stream.tracks().iter().map(|t| t.id.clone()).collect();
    }

    fn unbind(&mut self) {
        self.track_ids.clear();
    }

    pub fn is_bound(&self) -> bool {
        !self.track_ids.is_empty()
    }

    pub fn track_ids(&self) -> &[String] {
        &self.track_ids
    }

    pub fn surfaces_created(&self) -> u32 {
        self.surfaces_created
    }

    pub fn rebinds(&self) -> u32 {
        self.rebinds
    }
}

/// Owns the page's single capture session
///
/// Tracks of the previous session are always stopped before new hardware is
/// requested, and any remaining tracks are stopped on drop.
pub struct LocalMediaSession {
    platform: Arc<dyn MediaDevices>,
    profile: CaptureProfile,
    current: Option<CaptureStream>,
    preview: PreviewBinding,
}

impl LocalMediaSession {
    pub fn new(platform: Arc<dyn MediaDevices>, profile: CaptureProfile) -> Self {
        Self {
            platform,
            profile,
            current: None,
            preview: PreviewBinding::default(),
        }
    }

    /// Start capturing from the given devices, or the platform defaults
    pub async fn start(
        &mut self,
        camera: Option<&str>,
        microphone: Option<&str>,
    ) -> Result<&CaptureStream> {
        if self.current.is_some() {
            return self.switch_device(camera, microphone).await;
        }

        let stream = self.acquire(camera, microphone).await?;
        Ok(self.install(stream))
    }

    /// Replace the capture session with one built from different devices
    ///
    /// On failure the previous devices are re-acquired so the session stays
    /// usable; the original error is still returned.
    pub async fn switch_device(
        &mut self,
        camera: Option<&str>,
        microphone: Option<&str>,
    ) -> Result<&CaptureStream> {
        let previous = self.current.as_ref().map(|stream| {
            (
                stream.device_for(TrackKind::Video).map(str::to_string),
                stream.device_for(TrackKind::Audio).map(str::to_string),
            )
        });

        self.release_current();

        let acquired = self.acquire(camera, microphone).await;
        match acquired {
            Ok(stream) => Ok(self.install(stream)),
            Err(e) => {
                warn!("Device switch failed: {}", e);
                if let Some((prev_camera, prev_mic)) = previous {
                    let restored = self
                        .acquire(prev_camera.as_deref(), prev_mic.as_deref())
                        .await;
                    match restored {
                        Ok(stream) => {
                            info!("Restored previous capture devices");
                            self.install(stream);
                        }
                        Err(restore) => warn!("Failed to restore previous devices: {}", restore),
                    }
                }
                Err(e)
            }
        }
    }

    /// Stop every track and unbind the preview
    pub fn stop(&mut self) {
        self.release_current();
        self.preview.unbind();
    }

    pub fn current(&self) -> Option<&CaptureStream> {
        self.current.as_ref()
    }

    pub fn tracks(&self) -> Vec<MediaTrack> {
        self.current
            .as_ref()
            .map(|s| s.tracks().to_vec())
            .unwrap_or_default()
    }

    pub fn preview(&self) -> &PreviewBinding {
        &self.preview
    }

    pub fn profile(&self) -> CaptureProfile {
        self.profile
    }

    async fn acquire(&self, camera: Option<&str>, microphone: Option<&str>) -> Result<CaptureStream> {
        let constraints = self.profile.constraints(camera, microphone);
        let stream = self.platform.get_user_media(&constraints).await?;

        if stream.is_empty() {
            return Err(SessionError::device_unavailable(
                camera.or(microphone).unwrap_or("default"),
                "platform returned no tracks",
            ));
        }

        info!(
            "Capture started: {} track(s) at {}x{} via {}",
            stream.tracks().len(),
            self.profile.width,
            self.profile.height,
            self.platform.name()
        );
        Ok(stream)
    }

    fn install(&mut self, stream: CaptureStream) -> &CaptureStream {
        self.preview.bind(&stream);
        self.current.insert(stream)
    }

    fn release_current(&mut self) {
        if let Some(stream) = self.current.take() {
            for track in stream.into_tracks() {
                self.platform.stop_track(&track);
            }
            info!("Capture session released");
        }
    }
}

impl Drop for LocalMediaSession {
    fn drop(&mut self) {
        self.release_current();
    }
}
