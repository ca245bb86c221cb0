//! Status projection
//!
//! A pure mapping from the page's current state to the record the rendering
//! surface displays. Nothing here is cached: every call re-derives the view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SessionError;
use crate::page::PageVariant;
use crate::session::{
    ParticipantSet, PlaybackSettings, PlayerState, RemoteMediaBinding, SessionState,
};

/// State of whichever remote object the page owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    Session(SessionState),
    Player(PlayerState),
}

/// Everything the projection reads
#[derive(Debug, Clone, Copy)]
pub struct StatusInput<'a> {
    pub variant: PageVariant,
    pub sdk_ready: bool,
    pub preview_ready: bool,
    pub remote: RemoteState,
    pub participants: &'a ParticipantSet,
    pub binding: &'a RemoteMediaBinding,
    pub last_error: Option<&'a SessionError>,
    pub playback: PlaybackSettings,
    pub connected_since: Option<DateTime<Utc>>,
}

/// Display record for the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub variant: PageVariant,
    pub headline: String,
    pub is_live: bool,
    /// Empty when there is no error to show
    pub error: String,
    pub sdk_ready: bool,
    pub preview_ready: bool,
    /// Remote participants (stage-broadcast only)
    pub viewers: Vec<String>,
    /// Participant currently displayed (stage-watch only)
    pub broadcaster: Option<String>,
    pub volume: f32,
    pub muted: bool,
    pub connected_since: Option<DateTime<Utc>>,
}

pub fn project(input: &StatusInput<'_>) -> StatusView {
    let (headline, is_live) = match input.remote {
        RemoteState::Session(state) => session_headline(input, state),
        RemoteState::Player(state) => (player_headline(state).to_string(), state.is_playing()),
    };

    let viewers = match input.variant {
        PageVariant::StageBroadcast => input.participants.ids(),
        _ => Vec::new(),
    };

    StatusView {
        variant: input.variant,
        headline,
        is_live,
        error: input.last_error.map(|e| e.to_string()).unwrap_or_default(),
        sdk_ready: input.sdk_ready,
        preview_ready: input.preview_ready,
        viewers,
        broadcaster: input.binding.current().map(|m| m.participant_id.clone()),
        volume: input.playback.volume,
        muted: input.playback.muted,
        connected_since: input.connected_since,
    }
}

fn session_headline(input: &StatusInput<'_>, state: SessionState) -> (String, bool) {
    let viewer = input.variant.renders_remote_media();
    let headline = match state {
        SessionState::Idle if input.preview_ready => "Preview ready",
        SessionState::Idle => "Not connected",
        SessionState::Connecting => "Connecting…",
        SessionState::Active if viewer && input.binding.is_displaying() => "Watching live",
        SessionState::Active if viewer => "Waiting for stream…",
        SessionState::Active => "Active",
        SessionState::Reconnecting => "Reconnecting…",
        SessionState::Disconnected => "Disconnected",
        SessionState::Failed => "Failed",
    };

    let is_live = if viewer {
        state.is_on_air() && input.binding.is_displaying()
    } else {
        state.is_on_air()
    };
    (headline.to_string(), is_live)
}

fn player_headline(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Idle => "Idle",
        PlayerState::Ready => "Ready",
        PlayerState::Playing => "Playing",
        PlayerState::Buffering => "Buffering…",
        PlayerState::Ended => "Stream ended",
        PlayerState::Error => "Error",
    }
}
