use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::credentials::Credentials;
use super::state::SessionState;
use crate::error::{Result, SessionError};
use crate::media::{MediaTrack, TrackKind};
use crate::vendor::{
    decode, BroadcastClient, BroadcastSdk, EventEnvelope, EventHub, IngestClientConfig, SessionId,
    StageEvent, StreamPreset, VendorError, VendorEvent, VendorSignal,
};

const VIDEO_INPUT: &str = "camera";
const AUDIO_INPUT: &str = "microphone";

/// Publish-only ingest broadcast
pub struct IngestController {
    sdk: Arc<dyn BroadcastSdk>,
    hub: EventHub,
    state: SessionState,
    client: Option<Box<dyn BroadcastClient>>,
    session: Option<SessionId>,
    connected_since: Option<DateTime<Utc>>,
}

impl IngestController {
    pub fn new(sdk: Arc<dyn BroadcastSdk>, hub: EventHub) -> Self {
        Self {
            sdk,
            hub,
            state: SessionState::Idle,
            client: None,
            session: None,
            connected_since: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn connected_since(&self) -> Option<DateTime<Utc>> {
        self.connected_since
    }

    /// Create the ingest client, attach `tracks` and start broadcasting
    pub async fn connect(&mut self, credentials: &Credentials, tracks: &[MediaTrack]) -> Result<()> {
        if self.state.is_live() {
            return Err(SessionError::InvalidState(format!(
                "broadcast already {:?}",
                self.state
            )));
        }

        credentials.validate()?;
        let Credentials::Ingest {
            ingest_endpoint,
            stream_key,
        } = credentials
        else {
            return Err(SessionError::MissingCredentials(
                "ingest endpoint and stream key are required".to_string(),
            ));
        };

        if tracks.is_empty() {
            return Err(SessionError::ConnectFailed(
                "no media tracks available; check camera/microphone permissions".to_string(),
            ));
        }

        info!("Starting broadcast to {}", ingest_endpoint);
        self.state = SessionState::Connecting;
        self.connected_since = None;

        let sink = self.hub.sink();
        let session = sink.session();
        let config = IngestClientConfig {
            ingest_endpoint: ingest_endpoint.clone(),
            stream_preset: StreamPreset::StandardLandscape,
        };

        let created = self.sdk.create_client(config, sink).await;
        let client = match created {
            Ok(client) => client,
            Err(e) => return Err(self.fail(format!("failed to create broadcast client: {}", e))),
        };
        self.client = Some(client);
        self.session = Some(session);

        if let Err(e) = self.attach(tracks).await {
            return Err(self.fail(format!("failed to attach input devices: {}", e)));
        }

        let started = match self.client.as_mut() {
            Some(client) => client.start_broadcast(stream_key).await,
            None => return Err(self.fail("broadcast client vanished".to_string())),
        };
        if let Err(e) = started {
            return Err(self.fail(format!("failed to start broadcast: {}", e)));
        }

        self.state = SessionState::Active;
        self.connected_since = Some(Utc::now());
        info!("Broadcast live (session {})", session);
        Ok(())
    }

    /// Stop broadcasting and release the client; safe to call in any state
    pub async fn disconnect(&mut self) {
        if let Some(mut client) = self.client.take() {
            info!("Stopping broadcast");
            if let Err(e) = client.stop_broadcast().await {
                warn!("Failed to stop broadcast cleanly: {}", e);
            }
            client.delete();
        }
        self.session = None;
        self.connected_since = None;
        self.state = SessionState::Disconnected;
    }

    /// Re-publish new local tracks without tearing the broadcast down
    pub async fn swap_tracks(&mut self, tracks: &[MediaTrack]) -> Result<()> {
        if self.client.is_none() || !self.state.is_on_air() {
            return Ok(());
        }
        self.detach().await?;
        // With the old inputs gone a failed attach leaves nothing on air
        if let Err(e) = self.attach(tracks).await {
            error!("Broadcast lost its inputs: {}", e);
            self.release();
            self.state = SessionState::Failed;
            return Err(SessionError::VendorRuntimeError(format!(
                "failed to attach input devices: {}",
                e
            )));
        }
        info!("Swapped broadcast inputs to {} track(s)", tracks.len());
        Ok(())
    }

    /// Apply a vendor event; events from released sessions are dropped
    pub async fn handle_event(&mut self, envelope: EventEnvelope) -> Result<()> {
        if self.session != Some(envelope.session) {
            debug!("Dropping event from stale session {}", envelope.session);
            return Ok(());
        }
        let VendorSignal::Session(event) = envelope.signal else {
            return Ok(());
        };
        self.apply(event)
    }

    fn apply(&mut self, event: VendorEvent) -> Result<()> {
        match decode(event)? {
            StageEvent::ConnectionStateChanged(connection) => {
                let next = self.state.on_connection(connection);
                if next != self.state {
                    info!("Broadcast state {:?} -> {:?}", self.state, next);
                }
                self.state = next;
                if !self.state.is_live() {
                    self.release();
                }
                Ok(())
            }
            StageEvent::Error(fault) => {
                error!("Broadcast error: {}", fault.message);
                self.state = self.state.on_error(fault.fatal);
                if !self.state.is_live() {
                    self.release();
                }
                Err(SessionError::VendorRuntimeError(fault.message))
            }
            other => {
                debug!("Ignoring broadcast event {:?}", other);
                Ok(())
            }
        }
    }

    async fn attach(&mut self, tracks: &[MediaTrack]) -> std::result::Result<(), VendorError> {
        let Some(client) = self.client.as_mut() else {
            return Ok(());
        };
        let video: Vec<MediaTrack> = tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Video)
            .cloned()
            .collect();
        let audio: Vec<MediaTrack> = tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Audio)
            .cloned()
            .collect();

        if !video.is_empty() {
            client.add_video_input_device(&video, VIDEO_INPUT, 0).await?;
        }
        if !audio.is_empty() {
            client.add_audio_input_device(&audio, AUDIO_INPUT).await?;
        }
        Ok(())
    }

    async fn detach(&mut self) -> Result<()> {
        let Some(client) = self.client.as_mut() else {
            return Ok(());
        };
        client.remove_video_input_device(VIDEO_INPUT).await?;
        client.remove_audio_input_device(AUDIO_INPUT).await?;
        Ok(())
    }

    /// Release the partially built session and mark it failed
    fn fail(&mut self, reason: String) -> SessionError {
        error!("Broadcast failed: {}", reason);
        self.release();
        self.state = SessionState::Failed;
        SessionError::ConnectFailed(reason)
    }

    fn release(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.delete();
        }
        self.session = None;
        self.connected_since = None;
    }
}
