use anyhow::{Context, Result};
use serde::Deserialize;

use crate::media::CaptureProfile;

pub const DEFAULT_BROADCAST_SDK_URL: &str =
    "https://web-broadcast.live-video.net/1.30.0/amazon-ivs-web-broadcast.js";
pub const DEFAULT_PLAYER_SDK_URL: &str =
    "https://player.live-video.net/1.32.0/amazon-ivs-player.min.js";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub sdk: SdkConfig,
    #[serde(default)]
    pub credentials: CredentialDefaults,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Versioned script URLs the vendor SDKs are loaded from
#[derive(Debug, Clone, Deserialize)]
pub struct SdkConfig {
    #[serde(default = "default_broadcast_url")]
    pub broadcast_url: String,
    #[serde(default = "default_player_url")]
    pub player_url: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            broadcast_url: default_broadcast_url(),
            player_url: default_player_url(),
        }
    }
}

/// Pre-filled, user-editable credential inputs. Blank unless configured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialDefaults {
    #[serde(default)]
    pub ingest_endpoint: String,
    #[serde(default)]
    pub stream_key: String,
    #[serde(default)]
    pub playback_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "CaptureProfile::ingest")]
    pub ingest: CaptureProfile,
    #[serde(default = "CaptureProfile::stage")]
    pub stage: CaptureProfile,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ingest: CaptureProfile::ingest(),
            stage: CaptureProfile::stage(),
        }
    }
}

fn default_service_name() -> String {
    "ivs-studio".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

fn default_broadcast_url() -> String {
    DEFAULT_BROADCAST_SDK_URL.to_string()
}

fn default_player_url() -> String {
    DEFAULT_PLAYER_SDK_URL.to_string()
}

impl Config {
    /// Load configuration from an optional file, overridden by `IVS_*` environment
    /// variables (e.g. `IVS_CREDENTIALS__STREAM_KEY`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("IVS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
