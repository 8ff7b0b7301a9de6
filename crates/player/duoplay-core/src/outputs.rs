//! Observable state published by the engine.
//!
//! The engine queues semantic events as its state changes; hosts drain them after each
//! command or transport event and forward them to the UI.

use serde::{Deserialize, Serialize};

use crate::transport::Role;

/// Playback position as shown to observers, taken from the primary transport only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSnapshot {
    pub current: f64,
    pub total: f64,
}

impl TimeSnapshot {
    /// Build a snapshot from raw transport readings. Unknown (`NaN`, infinite) values read
    /// as zero.
    pub fn from_raw(current: f64, total: f64) -> Self {
        Self {
            current: finite_or_zero(current),
            total: finite_or_zero(total),
        }
    }

    /// Position as a fraction of the total, in `[0, 1]`. Zero while the total is unknown.
    pub fn progress(&self) -> f64 {
        if self.total > 0.0 {
            (self.current / self.total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Which transports an `apply_sources` call reloaded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadSet {
    pub video: bool,
    pub audio: bool,
    pub subtitles: bool,
}

impl ReloadSet {
    #[inline]
    pub fn any_transport(&self) -> bool {
        self.video || self.audio
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.video || self.audio || self.subtitles)
    }
}

/// Discrete signals emitted as the engine's observable state changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum EngineEvent {
    PlayStateChanged { playing: bool },
    TimeChanged { current: f64, total: f64 },
    VolumeChanged { volume: f64 },
    RateChanged { rate: f64 },
    SourcesApplied { reloaded: ReloadSet },
    CommandRejected { role: Role, reason: String },
}

impl EngineEvent {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayStateChanged { .. } => "play_state_changed",
            Self::TimeChanged { .. } => "time_changed",
            Self::VolumeChanged { .. } => "volume_changed",
            Self::RateChanged { .. } => "rate_changed",
            Self::SourcesApplied { .. } => "sources_applied",
            Self::CommandRejected { .. } => "command_rejected",
        }
    }
}
