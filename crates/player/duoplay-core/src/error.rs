//! Error types for duoplay-core.
//!
//! Engine operations never fail; these cover the fallible edges around it:
//! platform command rejection, configuration parsing and content ingestion.

use serde::{Deserialize, Serialize};

/// A transport refused a command.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TransportError {
    /// Playback was refused by platform policy (e.g. autoplay restrictions).
    #[error("play rejected: {reason}")]
    PlayRejected { reason: String },

    /// The transport has been detached from its host element.
    #[error("transport detached")]
    Detached,
}

impl TransportError {
    pub fn play_rejected(reason: impl Into<String>) -> Self {
        Self::PlayRejected {
            reason: reason.into(),
        }
    }
}

/// Workspace-wide error type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DuoplayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration could not be parsed or holds out-of-range values.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Dropped content matched none of the known kinds.
    #[error("unrecognized content: {name}")]
    UnrecognizedContent { name: String },

    /// No content with this id exists in the library.
    #[error("content not found: {id}")]
    ContentNotFound { id: u32 },
}

impl DuoplayError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::InvalidConfig { .. } => "config",
            Self::UnrecognizedContent { .. } | Self::ContentNotFound { .. } => "content",
        }
    }
}

impl From<serde_json::Error> for DuoplayError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
