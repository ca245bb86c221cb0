use super::state::AppState;
use crate::error::{Result, SessionError};
use crate::media::DeviceLists;
use crate::session::CredentialPatch;
use crate::status::StatusView;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectDevicesRequest {
    pub camera: Option<String>,
    pub microphone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: f32,
}

#[derive(Debug, Deserialize)]
pub struct MuteRequest {
    pub muted: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: StatusView,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: DeviceLists,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Page status after the rejected operation, when the page is reachable
    pub status: Option<StatusView>,
}

fn status_code(error: &SessionError) -> StatusCode {
    match error {
        SessionError::MissingCredentials(_) => StatusCode::BAD_REQUEST,
        SessionError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        SessionError::DeviceUnavailable { .. } | SessionError::InvalidState(_) => {
            StatusCode::CONFLICT
        }
        SessionError::ConnectFailed(_) | SessionError::VendorRuntimeError(_) => {
            StatusCode::BAD_GATEWAY
        }
        SessionError::SdkLoadFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn reject(state: &AppState, e: SessionError) -> Response {
    error!("Request failed: {}", e);
    let status = state.page.status().await.ok();
    (
        status_code(&e),
        Json(ErrorResponse {
            error: e.to_string(),
            status,
        }),
    )
        .into_response()
}

async fn respond(state: &AppState, result: Result<StatusView>) -> Response {
    match result {
        Ok(status) => (StatusCode::OK, Json(StatusResponse { status })).into_response(),
        Err(e) => reject(state, e).await,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> Response {
    let result = state.page.status().await;
    respond(&state, result).await
}

/// GET /devices
pub async fn get_devices(State(state): State<AppState>) -> Response {
    match state.page.devices().await {
        Ok(devices) => (StatusCode::OK, Json(DevicesResponse { devices })).into_response(),
        Err(e) => reject(&state, e).await,
    }
}

/// POST /connect
/// Connect with the given credentials; omitted fields keep their pre-filled value
pub async fn connect(
    State(state): State<AppState>,
    Json(patch): Json<CredentialPatch>,
) -> Response {
    info!("Connect requested");
    let result = state.page.connect(patch).await;
    respond(&state, result).await
}

/// POST /disconnect
pub async fn disconnect(State(state): State<AppState>) -> Response {
    info!("Disconnect requested");
    let result = state.page.disconnect().await;
    respond(&state, result).await
}

/// POST /devices/select
pub async fn select_devices(
    State(state): State<AppState>,
    Json(req): Json<SelectDevicesRequest>,
) -> Response {
    info!(
        "Device change requested: camera={:?} microphone={:?}",
        req.camera, req.microphone
    );
    match state.page.select_devices(req.camera, req.microphone).await {
        Ok(devices) => (StatusCode::OK, Json(DevicesResponse { devices })).into_response(),
        Err(e) => reject(&state, e).await,
    }
}

/// POST /playback/volume
pub async fn set_volume(
    State(state): State<AppState>,
    Json(req): Json<VolumeRequest>,
) -> Response {
    let result = state.page.set_volume(req.volume).await;
    respond(&state, result).await
}

/// POST /playback/mute
pub async fn set_muted(State(state): State<AppState>, Json(req): Json<MuteRequest>) -> Response {
    let result = state.page.set_muted(req.muted).await;
    respond(&state, result).await
}

/// POST /playback/play
pub async fn play(State(state): State<AppState>) -> Response {
    let result = state.page.play().await;
    respond(&state, result).await
}

/// POST /playback/pause
pub async fn pause(State(state): State<AppState>) -> Response {
    let result = state.page.pause().await;
    respond(&state, result).await
}
