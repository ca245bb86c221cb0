use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::binding::{PrimaryMedia, RemoteMediaBinding};
use super::credentials::Credentials;
use super::participants::ParticipantSet;
use super::state::SessionState;
use super::strategy::PublishStrategy;
use crate::error::{Result, SessionError};
use crate::media::MediaTrack;
use crate::vendor::{
    decode, EventEnvelope, EventHub, SessionId, Stage, StageEvent, StageSdk, StageStrategy,
    VendorEvent, VendorSignal, VideoEncodingConfig,
};

/// Which side of the stage this page plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRole {
    /// Publishes local tracks and subscribes to everyone
    Publisher,
    /// Publishes nothing and renders one remote broadcaster
    Viewer,
}

/// Real-time stage session
pub struct StageController {
    sdk: Arc<dyn StageSdk>,
    role: StageRole,
    hub: EventHub,
    state: SessionState,
    stage: Option<Box<dyn Stage>>,
    session: Option<SessionId>,
    strategy: Arc<PublishStrategy>,
    video_config: VideoEncodingConfig,
    participants: ParticipantSet,
    binding: RemoteMediaBinding,
    connected_since: Option<DateTime<Utc>>,
}

impl StageController {
    pub fn new(
        sdk: Arc<dyn StageSdk>,
        role: StageRole,
        hub: EventHub,
        video_config: VideoEncodingConfig,
    ) -> Self {
        let strategy = match role {
            StageRole::Publisher => PublishStrategy::publisher(),
            StageRole::Viewer => PublishStrategy::viewer(),
        };
        Self {
            sdk,
            role,
            hub,
            state: SessionState::Idle,
            stage: None,
            session: None,
            strategy: Arc::new(strategy),
            video_config,
            participants: ParticipantSet::new(),
            binding: RemoteMediaBinding::default(),
            connected_since: None,
        }
    }

    pub fn role(&self) -> StageRole {
        self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn participants(&self) -> &ParticipantSet {
        &self.participants
    }

    pub fn binding(&self) -> &RemoteMediaBinding {
        &self.binding
    }

    pub fn connected_since(&self) -> Option<DateTime<Utc>> {
        self.connected_since
    }

    /// Create the stage and join it
    ///
    /// Publishers must supply at least one local track; viewers ignore `tracks`.
    pub async fn connect(&mut self, credentials: &Credentials, tracks: &[MediaTrack]) -> Result<()> {
        if self.state.is_live() {
            return Err(SessionError::InvalidState(format!(
                "stage already {:?}",
                self.state
            )));
        }

        credentials.validate()?;
        let Credentials::Stage { participant_token } = credentials else {
            return Err(SessionError::MissingCredentials(
                "a participant token is required".to_string(),
            ));
        };

        self.participants.clear();
        self.binding.clear();

        if self.role == StageRole::Publisher {
            let count = self.strategy.install(tracks, self.video_config);
            if count == 0 {
                return Err(SessionError::ConnectFailed(
                    "no media streams available; check camera/microphone permissions".to_string(),
                ));
            }
            info!("Prepared {} local stream(s) for publishing", count);
        }

        info!("Joining stage as {:?}", self.role);
        self.state = SessionState::Connecting;
        self.connected_since = None;

        let sink = self.hub.sink();
        let session = sink.session();
        let strategy: Arc<dyn StageStrategy> = self.strategy.clone();

        let stage = match self.sdk.create_stage(participant_token, strategy, sink) {
            Ok(stage) => stage,
            Err(e) => return Err(self.fail(format!("failed to create stage: {}", e)).await),
        };
        self.stage = Some(stage);
        self.session = Some(session);

        let joined = match self.stage.as_mut() {
            Some(stage) => stage.join().await,
            None => return Err(self.fail("stage vanished".to_string()).await),
        };
        if let Err(e) = joined {
            return Err(self.fail(format!("failed to join stage: {}", e)).await);
        }

        self.state = SessionState::Active;
        self.connected_since = Some(Utc::now());
        info!("Joined stage (session {})", session);
        Ok(())
    }

    /// Leave the stage; safe to call in any state
    pub async fn disconnect(&mut self) {
        self.release().await;
        self.state = SessionState::Disconnected;
    }

    /// Offer new local tracks and have the stage re-query its strategy
    pub fn swap_tracks(&mut self, tracks: &[MediaTrack]) {
        if self.role != StageRole::Publisher {
            return;
        }
        let count = self.strategy.install(tracks, self.video_config);
        if let Some(stage) = self.stage.as_mut() {
            stage.refresh_strategy();
            info!("Republished {} local stream(s)", count);
        }
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
        self.apply(event).await
    }

    async fn apply(&mut self, event: VendorEvent) -> Result<()> {
        match decode(event)? {
            StageEvent::ConnectionStateChanged(connection) => {
                let next = self.state.on_connection(connection);
                if next != self.state {
                    info!("Stage state {:?} -> {:?}", self.state, next);
                }
                self.state = next;
                if !self.state.is_live() {
                    self.release().await;
                }
            }
            StageEvent::ParticipantJoined(participant) => {
                info!(
                    "Participant joined: {} (local={})",
                    participant.user_id, participant.is_local
                );
                self.participants.join(&participant);
            }
            StageEvent::ParticipantLeft(participant) => {
                info!("Participant left: {}", participant.user_id);
                self.participants.leave(&participant);
                if self.binding.displays(&participant.user_id) {
                    info!("Broadcaster {} left; waiting for stream", participant.user_id);
                    self.binding.clear();
                }
            }
            StageEvent::StreamsAdded {
                participant,
                streams,
            } => match self.role {
                StageRole::Publisher => {
                    if let Some(stage) = self.stage.as_mut() {
                        stage.refresh_strategy();
                    }
                }
                StageRole::Viewer => {
                    if participant.is_local || self.participants.is_local_id(&participant.user_id) {
                        debug!("Skipping local participant streams");
                    } else if let Some(media) = PrimaryMedia::select(&participant.user_id, &streams) {
                        info!("Displaying streams of {}", participant.user_id);
                        self.binding.replace(media);
                    } else {
                        warn!(
                            "Participant {} added no audio or video stream",
                            participant.user_id
                        );
                    }
                }
            },
            StageEvent::StreamsRemoved { participant, .. } => {
                if self.binding.displays(&participant.user_id) {
                    info!("Streams of {} removed; waiting for stream", participant.user_id);
                    self.binding.clear();
                }
            }
            StageEvent::StreamMuteChanged {
                participant,
                stream,
            } => {
                debug!(
                    "Mute changed: {} {:?} muted={}",
                    participant.user_id, stream.stream_type, stream.is_muted
                );
                self.binding.set_muted(&participant.user_id, &stream);
            }
            StageEvent::Error(fault) => {
                error!("Stage error: {}", fault.message);
                self.state = self.state.on_error(fault.fatal);
                if !self.state.is_live() {
                    self.release().await;
                }
                return Err(SessionError::VendorRuntimeError(fault.message));
            }
        }
        Ok(())
    }

    /// Release the partially built session and mark it failed
    async fn fail(&mut self, reason: String) -> SessionError {
        error!("Stage connect failed: {}", reason);
        self.release().await;
        self.state = SessionState::Failed;
        SessionError::ConnectFailed(reason)
    }

    async fn release(&mut self) {
        if let Some(mut stage) = self.stage.take() {
            if let Err(e) = stage.leave().await {
                warn!("Error leaving stage: {}", e);
            }
        }
        self.session = None;
        self.connected_since = None;
        self.participants.clear();
        self.binding.clear();
        self.strategy.clear();
    }
}
