use thiserror::Error;

/// Errors surfaced by device, session and page operations.
///
/// Every variant ends up as the error text of the status view; none of them
/// is retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device unavailable [{device}]: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    #[error("Vendor runtime error: {0}")]
    VendorRuntimeError(String),

    #[error("SDK load failed: {0}")]
    SdkLoadFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl SessionError {
    /// Device errors leave the previous capture session usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::DeviceUnavailable { .. })
    }

    pub fn device_unavailable(device: impl Into<String>, reason: impl Into<String>) -> Self {
        SessionError::DeviceUnavailable {
            device: device.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
