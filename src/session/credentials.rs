use serde::{Deserialize, Serialize};

use crate::config::CredentialDefaults;
use crate::error::{Result, SessionError};

/// Connection parameters for one connect attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    Ingest {
        ingest_endpoint: String,
        stream_key: String,
    },
    Stage {
        participant_token: String,
    },
    Playback {
        playback_url: String,
    },
}

impl Credentials {
    /// Non-blank check only; the vendor validates the values themselves
    pub fn validate(&self) -> Result<()> {
        match self {
            Credentials::Ingest {
                ingest_endpoint,
                stream_key,
            } => {
                if is_blank(ingest_endpoint) || is_blank(stream_key) {
                    return Err(SessionError::MissingCredentials(
                        "please enter both ingest endpoint and stream key".to_string(),
                    ));
                }
            }
            Credentials::Stage { participant_token } => {
                if is_blank(participant_token) {
                    return Err(SessionError::MissingCredentials(
                        "please enter a participant token".to_string(),
                    ));
                }
            }
            Credentials::Playback { playback_url } => {
                if is_blank(playback_url) {
                    return Err(SessionError::MissingCredentials(
                        "please enter a playback URL".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Partial update of the credential inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPatch {
    #[serde(default)]
    pub ingest_endpoint: Option<String>,
    #[serde(default)]
    pub stream_key: Option<String>,
    #[serde(default)]
    pub participant_token: Option<String>,
    #[serde(default)]
    pub playback_url: Option<String>,
}

impl CredentialPatch {
    pub fn is_empty(&self) -> bool {
        self.ingest_endpoint.is_none()
            && self.stream_key.is_none()
            && self.participant_token.is_none()
            && self.playback_url.is_none()
    }
}

/// Editable credential inputs of a page, pre-filled from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialForm {
    pub ingest_endpoint: String,
    pub stream_key: String,
    pub participant_token: String,
    pub playback_url: String,
}

impl CredentialForm {
    pub fn prefilled(defaults: &CredentialDefaults) -> Self {
        Self {
            ingest_endpoint: defaults.ingest_endpoint.clone(),
            stream_key: defaults.stream_key.clone(),
            participant_token: String::new(),
            playback_url: defaults.playback_url.clone(),
        }
    }

    pub fn apply(&mut self, patch: CredentialPatch) {
        if let Some(v) = patch.ingest_endpoint {
            self.ingest_endpoint = v;
        }
        if let Some(v) = patch.stream_key {
            self.stream_key = v;
        }
        if let Some(v) = patch.participant_token {
            self.participant_token = v;
        }
        if let Some(v) = patch.playback_url {
            self.playback_url = v;
        }
    }

    pub fn ingest(&self) -> Credentials {
        Credentials::Ingest {
            ingest_endpoint: self.ingest_endpoint.trim().to_string(),
            stream_key: self.stream_key.trim().to_string(),
        }
    }

    pub fn stage(&self) -> Credentials {
        Credentials::Stage {
            participant_token: self.participant_token.trim().to_string(),
        }
    }

    pub fn playback(&self) -> Credentials {
        Credentials::Playback {
            playback_url: self.playback_url.trim().to_string(),
        }
    }
}
