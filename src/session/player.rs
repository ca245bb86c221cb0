use std::sync::Arc;
use tracing::{debug, error, info};

use super::credentials::Credentials;
use super::state::PlayerState;
use crate::error::{Result, SessionError};
use crate::vendor::{
    parse_fault, EventEnvelope, EventHub, Player, PlayerEvent, PlayerSdk, SessionId, VendorSignal,
};

/// Volume and mute of whatever remote audio the page renders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub volume: f32,
    pub muted: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
        }
    }
}

impl PlaybackSettings {
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = if volume.is_nan() {
            self.volume
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.volume
    }
}

/// Playback-only wrapper around the vendor player
pub struct PlayerController {
    sdk: Arc<dyn PlayerSdk>,
    hub: EventHub,
    player: Option<Box<dyn Player>>,
    session: Option<SessionId>,
    state: PlayerState,
    settings: PlaybackSettings,
    url: Option<String>,
}

impl PlayerController {
    pub fn new(sdk: Arc<dyn PlayerSdk>, hub: EventHub) -> Self {
        Self {
            sdk,
            hub,
            player: None,
            session: None,
            state: PlayerState::Idle,
            settings: PlaybackSettings::default(),
            url: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.settings
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Load the playback URL and start playing it
    pub fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        credentials.validate()?;
        let Credentials::Playback { playback_url } = credentials else {
            return Err(SessionError::MissingCredentials(
                "a playback URL is required".to_string(),
            ));
        };
        self.load(playback_url)?;
        self.play()
    }

    pub fn load(&mut self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(SessionError::MissingCredentials(
                "please enter a playback URL".to_string(),
            ));
        }
        self.ensure_player()?;

        let loaded = match self.player.as_mut() {
            Some(player) => player.load(url),
            None => return Err(SessionError::InvalidState("player not created".to_string())),
        };
        if let Err(e) = loaded {
            error!("Failed to load {}: {}", url, e);
            self.release();
            self.state = PlayerState::Error;
            return Err(SessionError::ConnectFailed(format!(
                "failed to start playback: {}",
                e
            )));
        }

        info!("Loaded playback URL {}", url);
        self.url = Some(url.to_string());
        Ok(())
    }

    pub fn play(&mut self) -> Result<()> {
        let player = self
            .player
            .as_mut()
            .ok_or_else(|| SessionError::InvalidState("nothing loaded".to_string()))?;
        player.play();
        Ok(())
    }

    pub fn pause(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.pause();
        }
    }

    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let volume = self.settings.set_volume(volume);
        if let Some(player) = self.player.as_mut() {
            player.set_volume(volume);
        }
        volume
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        if let Some(player) = self.player.as_mut() {
            player.set_muted(muted);
        }
    }

    /// Stop playback and release the player; safe to call in any state
    pub fn disconnect(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.pause();
        }
        self.release();
        self.state = PlayerState::Idle;
    }

    pub fn handle_event(&mut self, envelope: EventEnvelope) -> Result<()> {
        if self.session != Some(envelope.session) {
            debug!("Dropping event from stale player {}", envelope.session);
            return Ok(());
        }
        let VendorSignal::Player(event) = envelope.signal else {
            return Ok(());
        };

        let next = self.state.on_event(&event);
        if next != self.state {
            info!("Player state {:?} -> {:?}", self.state, next);
        }
        self.state = next;

        if let PlayerEvent::Error(payload) = event {
            let fault = parse_fault(&payload);
            error!("Player error: {}", fault.message);
            return Err(SessionError::VendorRuntimeError(format!(
                "player error: {}",
                fault.message
            )));
        }
        Ok(())
    }

    fn ensure_player(&mut self) -> Result<()> {
        if self.player.is_some() {
            return Ok(());
        }
        if !self.sdk.is_player_supported() {
            return Err(SessionError::SdkLoadFailed(
                "player is not supported on this platform".to_string(),
            ));
        }

        let sink = self.hub.sink();
        let session = sink.session();
        let mut player = self.sdk.create_player(sink).map_err(|e| {
            SessionError::ConnectFailed(format!("failed to initialize player: {}", e))
        })?;

        player.set_live_low_latency_enabled(true);
        player.set_autoplay(true);
        player.set_rebuffer_to_live(true);
        player.set_volume(self.settings.volume);
        player.set_muted(self.settings.muted);

        info!("Player created (session {})", session);
        self.player = Some(player);
        self.session = Some(session);
        self.state = PlayerState::Idle;
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.delete();
        }
        self.session = None;
        self.url = None;
    }
}
