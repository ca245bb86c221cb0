pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod page;
pub mod session;
pub mod status;
pub mod vendor;

pub use config::Config;
pub use error::{Result, SessionError};
pub use http::{create_router, AppState};
pub use media::{
    CaptureProfile, CaptureStream, DeviceDescriptor, DeviceKind, DeviceLists, DeviceRegistry,
    LocalMediaSession, LoopbackMediaDevices, MediaDevices, MediaTrack, TrackKind,
};
pub use page::{spawn, Page, PageHandle, PageVariant};
pub use session::{
    CredentialPatch, Credentials, IngestController, ParticipantSet, PlaybackSettings,
    PlayerController, PlayerState, RemoteMediaBinding, SessionState, StageController, StageRole,
};
pub use status::{project, RemoteState, StatusInput, StatusView};
pub use vendor::{EventEnvelope, EventHub, LoopbackVendor, VendorEvent, VendorSdk};
