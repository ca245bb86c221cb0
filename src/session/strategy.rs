use parking_lot::RwLock;
use tracing::debug;

use crate::media::{MediaTrack, TrackKind};
use crate::vendor::{
    LocalStageStream, StageParticipantInfo, StageStrategy, StreamType, SubscribeType,
    VideoEncodingConfig,
};

/// Static publish/subscribe policy over the current local tracks
///
/// The stage asks for the streams to publish on every refresh, so the
/// answer always reflects the tracks installed last.
pub struct PublishStrategy {
    publishing: bool,
    streams: RwLock<Vec<LocalStageStream>>,
}

impl PublishStrategy {
    /// Publishes every local track and subscribes to everyone
    pub fn publisher() -> Self {
        Self {
            publishing: true,
            streams: RwLock::new(Vec::new()),
        }
    }

    /// Publishes nothing and subscribes to everyone
    pub fn viewer() -> Self {
        Self {
            publishing: false,
            streams: RwLock::new(Vec::new()),
        }
    }

    /// Replace the eligible streams with one per local track
    pub fn install(&self, tracks: &[MediaTrack], video_config: VideoEncodingConfig) -> usize {
        if !self.publishing {
            return 0;
        }
        let streams: Vec<LocalStageStream> = tracks
            .iter()
            .map(|track| match track.kind {
                TrackKind::Video => LocalStageStream {
                    track: track.clone(),
                    stream_type: StreamType::Video,
                    video_config: Some(video_config),
                },
                TrackKind::Audio => LocalStageStream {
                    track: track.clone(),
                    stream_type: StreamType::Audio,
                    video_config: None,
                },
            })
            .collect();
        let count = streams.len();
        *self.streams.write() = streams;
        count
    }

    pub fn clear(&self) {
        self.streams.write().clear();
    }
}

impl StageStrategy for PublishStrategy {
    fn stage_streams_to_publish(&self) -> Vec<LocalStageStream> {
        let streams = self.streams.read().clone();
        debug!("Strategy offering {} stream(s)", streams.len());
        streams
    }

    fn should_publish_participant(&self, _participant: &StageParticipantInfo) -> bool {
        self.publishing
    }

    fn should_subscribe_to_participant(&self, _participant: &StageParticipantInfo) -> SubscribeType {
        SubscribeType::AudioVideo
    }
}
