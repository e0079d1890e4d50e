//! Connection-status indicator.

use serde::Serialize;

use crate::render::Tone;

/// What the status badge in the page header says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Connecting,
    Syncing,
    Connected,
    /// Connected and subscribed to live changes.
    Live,
    ConnectionError,
    MissingKeys,
    /// A save failed.
    Error,
    DeleteFailed,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connecting => "• Connecting…",
            Self::Syncing => "• Syncing…",
            Self::Connected => "• Connected",
            Self::Live => "• Connected (live)",
            Self::ConnectionError => "• Connection error",
            Self::MissingKeys => "• Missing backend keys",
            Self::Error => "• Error (see logs)",
            Self::DeleteFailed => "• Delete failed",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Connecting | Self::Syncing => Tone::Warn,
            Self::Connected | Self::Live => Tone::Ok,
            Self::ConnectionError | Self::MissingKeys | Self::Error | Self::DeleteFailed => {
                Tone::Bad
            }
        }
    }
}
