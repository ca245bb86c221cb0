//! HTTP control surface for one page
//!
//! - GET /health - Health check
//! - GET /status - Current status view
//! - GET /devices - Camera and microphone lists with the current selection
//! - POST /connect - Connect with (partial) credentials
//! - POST /disconnect - Release the remote session
//! - POST /devices/select - Switch capture devices
//! - POST /playback/{volume,mute,play,pause} - Remote audio and player control

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
