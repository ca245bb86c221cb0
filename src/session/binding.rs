use serde::Serialize;

use crate::vendor::{RemoteStageStream, StreamType};

/// The single remote video + audio pair a viewer renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryMedia {
    pub participant_id: String,
    pub video_track: Option<String>,
    pub audio_track: Option<String>,
    pub video_muted: bool,
    pub audio_muted: bool,
}

impl PrimaryMedia {
    /// First video-typed and first audio-typed stream; `None` if neither exists
    pub fn select(participant_id: &str, streams: &[RemoteStageStream]) -> Option<Self> {
        let video = streams
            .iter()
            .find(|s| s.stream_type == Some(StreamType::Video));
        let audio = streams
            .iter()
            .find(|s| s.stream_type == Some(StreamType::Audio));

        if video.is_none() && audio.is_none() {
            return None;
        }

        Some(Self {
            participant_id: participant_id.to_string(),
            video_track: video.map(stream_track),
            audio_track: audio.map(stream_track),
            video_muted: video.is_some_and(|s| s.is_muted),
            audio_muted: audio.is_some_and(|s| s.is_muted),
        })
    }
}

fn stream_track(stream: &RemoteStageStream) -> String {
    stream.track_id.clone().unwrap_or_else(|| stream.id.clone())
}

/// What the viewer page is currently displaying
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteMediaBinding {
    current: Option<PrimaryMedia>,
}

impl RemoteMediaBinding {
    /// Swap the displayed pair; the previous pair, from any participant, is dropped
    pub fn replace(&mut self, media: PrimaryMedia) -> Option<PrimaryMedia> {
        self.current.replace(media)
    }

    pub fn clear(&mut self) -> Option<PrimaryMedia> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&PrimaryMedia> {
        self.current.as_ref()
    }

    pub fn displays(&self, participant_id: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|m| m.participant_id == participant_id)
    }

    pub fn is_displaying(&self) -> bool {
        self.current.is_some()
    }

    /// Track a mute flip on the displayed participant's stream
    pub fn set_muted(&mut self, participant_id: &str, stream: &RemoteStageStream) -> bool {
        let Some(media) = self.current.as_mut() else {
            return false;
        };
        if media.participant_id != participant_id {
            return false;
        }
        match stream.stream_type {
            Some(StreamType::Video) => media.video_muted = stream.is_muted,
            Some(StreamType::Audio) => media.audio_muted = stream.is_muted,
            None => return false,
        }
        true
    }
}
