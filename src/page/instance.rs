use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::variant::PageVariant;
use crate::config::Config;
use crate::error::{Result, SessionError};
use crate::media::{DeviceLists, DeviceRegistry, LocalMediaSession, MediaDevices, MediaTrack};
use crate::session::{
    CredentialForm, CredentialPatch, Credentials, IngestController, ParticipantSet,
    PlaybackSettings, PlayerController, RemoteMediaBinding, StageController, StageRole,
};
use crate::status::{project, RemoteState, StatusInput, StatusView};
use crate::vendor::{EventEnvelope, EventHub, VendorSdk, VideoEncodingConfig};

/// The one remote object a page owns
enum Remote {
    Ingest(IngestController),
    Stage(StageController),
    Player(PlayerController),
}

impl Remote {
    fn is_busy(&self) -> bool {
        match self {
            Remote::Ingest(c) => c.state().is_live(),
            Remote::Stage(c) => c.state().is_live(),
            Remote::Player(c) => c.state().is_playing(),
        }
    }

    async fn disconnect(&mut self) {
        match self {
            Remote::Ingest(c) => c.disconnect().await,
            Remote::Stage(c) => c.disconnect().await,
            Remote::Player(c) => c.disconnect(),
        }
    }

    async fn swap_tracks(&mut self, tracks: &[MediaTrack]) -> Result<()> {
        match self {
            Remote::Ingest(c) => c.swap_tracks(tracks).await,
            Remote::Stage(c) => {
                c.swap_tracks(tracks);
                Ok(())
            }
            Remote::Player(_) => Ok(()),
        }
    }
}

/// One page instance: capture, credentials and the remote session composed
/// for a single variant
///
/// A page is not shared; [`super::spawn`] moves it onto its own task.
pub struct Page {
    variant: PageVariant,
    vendor: VendorSdk,
    sdk_url: String,
    sdk_ready: bool,
    remote: Remote,
    registry: Option<DeviceRegistry>,
    local: Option<LocalMediaSession>,
    form: CredentialForm,
    playback: PlaybackSettings,
    last_error: Option<SessionError>,
}

impl Page {
    /// Build a page and the receiving end of its vendor event queue
    pub fn new(
        variant: PageVariant,
        config: &Config,
        vendor: VendorSdk,
        platform: Arc<dyn MediaDevices>,
    ) -> (Self, mpsc::UnboundedReceiver<EventEnvelope>) {
        let (hub, events) = EventHub::channel();
        let stage_video = VideoEncodingConfig {
            max_video_bitrate_kbps: config.capture.stage.max_video_bitrate_kbps,
            max_framerate: config.capture.stage.max_frame_rate,
        };

        let remote = match variant {
            PageVariant::Broadcast => {
                Remote::Ingest(IngestController::new(vendor.broadcast.clone(), hub))
            }
            PageVariant::Watch => Remote::Player(PlayerController::new(vendor.player.clone(), hub)),
            PageVariant::StageBroadcast => Remote::Stage(StageController::new(
                vendor.stage.clone(),
                StageRole::Publisher,
                hub,
                stage_video,
            )),
            PageVariant::StageWatch => Remote::Stage(StageController::new(
                vendor.stage.clone(),
                StageRole::Viewer,
                hub,
                stage_video,
            )),
        };

        let (registry, local) = if variant.captures_local_media() {
            let profile = match variant {
                PageVariant::Broadcast => config.capture.ingest,
                _ => config.capture.stage,
            };
            (
                Some(DeviceRegistry::new(platform.clone())),
                Some(LocalMediaSession::new(platform, profile)),
            )
        } else {
            (None, None)
        };

        let sdk_url = match variant {
            PageVariant::Watch => config.sdk.player_url.clone(),
            _ => config.sdk.broadcast_url.clone(),
        };

        let page = Self {
            variant,
            vendor,
            sdk_url,
            sdk_ready: false,
            remote,
            registry,
            local,
            form: CredentialForm::prefilled(&config.credentials),
            playback: PlaybackSettings::default(),
            last_error: None,
        };
        (page, events)
    }

    pub fn variant(&self) -> PageVariant {
        self.variant
    }

    pub fn form(&self) -> &CredentialForm {
        &self.form
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn local(&self) -> Option<&LocalMediaSession> {
        self.local.as_ref()
    }

    /// Load the vendor SDK, then run the blind capture-then-enumerate step
    pub async fn initialize(&mut self) -> Result<()> {
        let result = self.load_sdk_and_capture().await;
        self.record(result)
    }

    async fn load_sdk_and_capture(&mut self) -> Result<()> {
        if !self.sdk_ready {
            info!("Loading vendor SDK from {}", self.sdk_url);
            self.vendor.loader.load(&self.sdk_url).await?;

            if self.variant == PageVariant::Watch && !self.vendor.player.is_player_supported() {
                return Err(SessionError::SdkLoadFailed(
                    "player is not supported on this platform".to_string(),
                ));
            }
            self.sdk_ready = true;
        }

        // Labels stay blank until a grant exists, so capture before enumerating
        if let (Some(local), Some(registry)) = (self.local.as_mut(), self.registry.as_mut()) {
            if local.current().is_some() {
                debug!("Capture already running; keeping current devices");
                return Ok(());
            }
            local.start(None, None).await?;
            registry.list_devices().await?;
        }
        Ok(())
    }

    /// Merge `patch` into the credential form and connect the remote session
    pub async fn connect(&mut self, patch: CredentialPatch) -> Result<()> {
        let result = self.try_connect(patch).await;
        if result.is_ok() {
            self.last_error = None;
        }
        self.record(result)
    }

    async fn try_connect(&mut self, patch: CredentialPatch) -> Result<()> {
        if self.remote.is_busy() {
            return Err(SessionError::InvalidState(
                "already connected; disconnect first".to_string(),
            ));
        }

        self.form.apply(patch);
        let credentials = self.credentials();
        credentials.validate()?;

        if !self.sdk_ready {
            return Err(SessionError::SdkLoadFailed("SDK not loaded".to_string()));
        }

        let tracks = self
            .local
            .as_ref()
            .map(LocalMediaSession::tracks)
            .unwrap_or_default();

        match &mut self.remote {
            Remote::Ingest(c) => c.connect(&credentials, &tracks).await,
            Remote::Stage(c) => c.connect(&credentials, &tracks).await,
            Remote::Player(c) => c.connect(&credentials),
        }
    }

    fn credentials(&self) -> Credentials {
        match self.variant {
            PageVariant::Broadcast => self.form.ingest(),
            PageVariant::Watch => self.form.playback(),
            PageVariant::StageBroadcast | PageVariant::StageWatch => self.form.stage(),
        }
    }

    pub async fn disconnect(&mut self) {
        info!("Disconnecting {} page", self.variant);
        self.remote.disconnect().await;
    }

    /// Change capture devices, republishing in place when on air
    pub async fn select_devices(
        &mut self,
        camera: Option<String>,
        microphone: Option<String>,
    ) -> Result<DeviceLists> {
        let result = self.switch_devices(camera, microphone).await;
        self.record(result)
    }

    async fn switch_devices(
        &mut self,
        camera: Option<String>,
        microphone: Option<String>,
    ) -> Result<DeviceLists> {
        let (Some(registry), Some(local)) = (self.registry.as_mut(), self.local.as_mut()) else {
            return Err(SessionError::InvalidState(format!(
                "{} page has no local capture",
                self.variant
            )));
        };

        let previous_camera = registry.selected_camera().map(str::to_string);
        let previous_microphone = registry.selected_microphone().map(str::to_string);
        if let Some(id) = camera.as_deref() {
            registry.select_camera(id)?;
        }
        if let Some(id) = microphone.as_deref() {
            registry.select_microphone(id)?;
        }

        let target_camera = registry.selected_camera().map(str::to_string);
        let target_microphone = registry.selected_microphone().map(str::to_string);
        let switched = local
            .switch_device(target_camera.as_deref(), target_microphone.as_deref())
            .await;
        if let Err(e) = switched {
            if let Some(id) = previous_camera.as_deref() {
                if let Err(restore) = registry.select_camera(id) {
                    warn!("Could not reselect camera {}: {}", id, restore);
                }
            }
            if let Some(id) = previous_microphone.as_deref() {
                if let Err(restore) = registry.select_microphone(id) {
                    warn!("Could not reselect microphone {}: {}", id, restore);
                }
            }
            // The restored capture carries fresh tracks
            let restored = local.tracks();
            if !restored.is_empty() {
                if let Err(republish) = self.remote.swap_tracks(&restored).await {
                    warn!("Republishing restored devices failed: {}", republish);
                }
            }
            return Err(e);
        }

        if let Err(e) = registry.list_devices().await {
            warn!("Re-enumeration after device switch failed: {}", e);
        }

        let tracks = local.tracks();
        self.remote.swap_tracks(&tracks).await?;
        Ok(registry.lists())
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<f32> {
        self.require_remote_audio()?;
        let volume = self.playback.set_volume(volume);
        if let Remote::Player(c) = &mut self.remote {
            c.set_volume(volume);
        }
        Ok(volume)
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.require_remote_audio()?;
        self.playback.muted = muted;
        if let Remote::Player(c) = &mut self.remote {
            c.set_muted(muted);
        }
        Ok(())
    }

    pub fn play(&mut self) -> Result<()> {
        let result = match &mut self.remote {
            Remote::Player(c) => c.play(),
            _ => Err(SessionError::InvalidState(format!(
                "{} page has no player",
                self.variant
            ))),
        };
        self.record(result)
    }

    pub fn pause(&mut self) -> Result<()> {
        match &mut self.remote {
            Remote::Player(c) => {
                c.pause();
                Ok(())
            }
            _ => Err(SessionError::InvalidState(format!(
                "{} page has no player",
                self.variant
            ))),
        }
    }

    /// Apply one queued vendor event
    pub async fn handle_event(&mut self, envelope: EventEnvelope) -> Result<()> {
        let result = match &mut self.remote {
            Remote::Ingest(c) => c.handle_event(envelope).await,
            Remote::Stage(c) => c.handle_event(envelope).await,
            Remote::Player(c) => c.handle_event(envelope),
        };
        self.record(result)
    }

    pub fn status(&self) -> StatusView {
        let no_participants = ParticipantSet::new();
        let no_binding = RemoteMediaBinding::default();

        let (remote, participants, binding, connected_since) = match &self.remote {
            Remote::Ingest(c) => (
                RemoteState::Session(c.state()),
                &no_participants,
                &no_binding,
                c.connected_since(),
            ),
            Remote::Stage(c) => (
                RemoteState::Session(c.state()),
                c.participants(),
                c.binding(),
                c.connected_since(),
            ),
            Remote::Player(c) => (
                RemoteState::Player(c.state()),
                &no_participants,
                &no_binding,
                None,
            ),
        };

        project(&StatusInput {
            variant: self.variant,
            sdk_ready: self.sdk_ready,
            preview_ready: self
                .local
                .as_ref()
                .map(|l| l.preview().is_bound())
                .unwrap_or(false),
            remote,
            participants,
            binding,
            last_error: self.last_error.as_ref(),
            playback: self.playback,
            connected_since,
        })
    }

    pub fn devices(&self) -> DeviceLists {
        self.registry
            .as_ref()
            .map(DeviceRegistry::lists)
            .unwrap_or_default()
    }

    /// Release the remote session, then every capture track
    pub async fn shutdown(&mut self) {
        info!("Tearing down {} page", self.variant);
        self.remote.disconnect().await;
        if let Some(local) = self.local.as_mut() {
            local.stop();
        }
    }

    fn require_remote_audio(&self) -> Result<()> {
        if self.variant.renders_remote_media() {
            Ok(())
        } else {
            Err(SessionError::InvalidState(format!(
                "{} page renders no remote audio",
                self.variant
            )))
        }
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!("{} page: {}", self.variant, e);
            self.last_error = Some(e.clone());
        }
        result
    }
}
