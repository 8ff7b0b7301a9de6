//! Seek phase tracking.

use serde::{Deserialize, Serialize};

/// Where the pair is in a seek.
///
/// `Idle → PrimarySeeking → Settling → Idle`. A new seek at any point restarts from
/// `PrimarySeeking` with the new target; no queue is kept.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SeekPhase {
    #[default]
    Idle,
    /// `currentTime` was written on the primary; its `seeking` event has not arrived.
    PrimarySeeking { target: f64 },
    /// The target was mirrored to the secondary; waiting for both to report `seeked`.
    Settling { target: f64 },
}

impl SeekPhase {
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[inline]
    pub fn target(&self) -> Option<f64> {
        match *self {
            Self::Idle => None,
            Self::PrimarySeeking { target } | Self::Settling { target } => Some(target),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PrimarySeeking { .. } => "primary_seeking",
            Self::Settling { .. } => "settling",
        }
    }
}
