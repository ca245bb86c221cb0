use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four page compositions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageVariant {
    /// Ingest broadcast from local capture
    Broadcast,
    /// Playback of an ingest channel
    Watch,
    /// Real-time stage, publishing local capture
    StageBroadcast,
    /// Real-time stage, viewing one broadcaster
    StageWatch,
}

impl PageVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            PageVariant::Broadcast => "broadcast",
            PageVariant::Watch => "watch",
            PageVariant::StageBroadcast => "stage-broadcast",
            PageVariant::StageWatch => "stage-watch",
        }
    }

    /// Variants that own a local capture session
    pub fn captures_local_media(self) -> bool {
        matches!(self, PageVariant::Broadcast | PageVariant::StageBroadcast)
    }

    /// Variants that render one remote broadcaster
    pub fn renders_remote_media(self) -> bool {
        matches!(self, PageVariant::Watch | PageVariant::StageWatch)
    }
}

impl fmt::Display for PageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broadcast" => Ok(PageVariant::Broadcast),
            "watch" => Ok(PageVariant::Watch),
            "stage-broadcast" => Ok(PageVariant::StageBroadcast),
            "stage-watch" => Ok(PageVariant::StageWatch),
            other => Err(format!(
                "unknown page variant '{}' (expected broadcast, watch, stage-broadcast or stage-watch)",
                other
            )),
        }
    }
}
