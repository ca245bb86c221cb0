//! Local capture: device enumeration, the capture session and its preview
//!
//! The platform (`MediaDevices`) is injected so the same session logic runs
//! against a browser bridge, a native capture stack or the in-memory loopback.

pub mod backend;
pub mod capture;
pub mod device;
pub mod loopback;

pub use backend::{
    AudioConstraints, CaptureConstraints, CaptureProfile, CaptureStream, MediaDeviceInfo,
    MediaDevices, MediaTrack, TrackKind, VideoConstraints,
};
pub use capture::{LocalMediaSession, PreviewBinding};
pub use device::{DeviceDescriptor, DeviceKind, DeviceLists, DeviceRegistry};
pub use loopback::{DeviceCall, LoopbackMediaDevices};
