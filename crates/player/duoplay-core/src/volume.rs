//! UI-side volume helpers.
//!
//! The engine only knows a logical volume. Muting is modelled by the controls as
//! "volume 0, remembering what it was", which is what [`MuteToggle`] does.

use serde::{Deserialize, Serialize};

/// Remembers the volume in effect before muting.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MuteToggle {
    previous: f64,
}

impl Default for MuteToggle {
    fn default() -> Self {
        Self { previous: 1.0 }
    }
}

impl MuteToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Volume to apply after a mute-button press given the `current` volume.
    pub fn toggle(&mut self, current: f64) -> f64 {
        if current > 0.0 {
            self.previous = current;
            0.0
        } else {
            self.previous
        }
    }

    #[inline]
    pub fn previous(&self) -> f64 {
        self.previous
    }
}

/// Coarse loudness bucket, used to pick a speaker icon.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeLevel {
    Muted,
    Low,
    Medium,
    High,
}

impl VolumeLevel {
    pub fn from_volume(volume: f64) -> Self {
        if volume <= 0.0 {
            Self::Muted
        } else if volume <= 1.0 / 3.0 {
            Self::Low
        } else if volume <= 2.0 / 3.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Muted => "🔇",
            Self::Low => "🔈",
            Self::Medium => "🔉",
            Self::High => "🔊",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_restores_previous_volume() {
        let mut mute = MuteToggle::new();
        assert_eq!(mute.toggle(0.4), 0.0);
        assert_eq!(mute.toggle(0.0), 0.4);
    }

    #[test]
    fn unmute_without_history_restores_full_volume() {
        let mut mute = MuteToggle::new();
        assert_eq!(mute.toggle(0.0), 1.0);
    }

    #[test]
    fn levels() {
        assert_eq!(VolumeLevel::from_volume(0.0), VolumeLevel::Muted);
        assert_eq!(VolumeLevel::from_volume(0.2), VolumeLevel::Low);
        assert_eq!(VolumeLevel::from_volume(0.5), VolumeLevel::Medium);
        assert_eq!(VolumeLevel::from_volume(0.9), VolumeLevel::High);
    }
}
