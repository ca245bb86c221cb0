//! Remote session management
//!
//! This module owns the single vendor connection of a page:
//! - Ingest broadcast (publish-only)
//! - Real-time stage (publish + subscribe, or subscribe-only)
//! - Playback player
//!
//! plus the credential inputs, state machines, participant set and the
//! remote media binding they drive.

mod binding;
mod credentials;
mod ingest;
mod participants;
mod player;
mod stage;
mod state;
mod strategy;

pub use binding::{PrimaryMedia, RemoteMediaBinding};
pub use credentials::{CredentialForm, CredentialPatch, Credentials};
pub use ingest::IngestController;
pub use participants::ParticipantSet;
pub use player::{PlaybackSettings, PlayerController};
pub use stage::{StageController, StageRole};
pub use state::{PlayerState, SessionState};
pub use strategy::PublishStrategy;
