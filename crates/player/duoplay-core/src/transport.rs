//! The capability contract the engine drives.
//!
//! A transport is one controllable playback resource (a `<video>` or `<audio>` element in
//! the browser, a mock in tests). The engine never creates or destroys transports; it only
//! issues commands and reacts to the events the host feeds back through
//! [`SyncEngine::handle_event`](crate::SyncEngine::handle_event).

use serde::{Deserialize, Serialize};

use crate::content::MediaContent;
use crate::error::TransportError;

/// Which side of the pair a transport plays.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The video transport; its clock is the one published to observers.
    Primary,
    /// The separately sourced audio transport, kept in sync with the primary.
    Secondary,
}

impl Role {
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

/// Notifications a transport raises. Hosts forward them to the engine in arrival order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportEvent {
    Play,
    Pause,
    Seeking,
    Seeked,
    RateChange,
    TimeUpdate,
    DurationChange,
    /// A `play()` accepted synchronously was later refused (rejected play promise).
    PlayRejected { reason: String },
}

impl TransportEvent {
    /// Map a DOM media event name onto an event; unknown names yield `None`.
    pub fn from_dom_name(name: &str) -> Option<Self> {
        Some(match name {
            "play" => Self::Play,
            "pause" => Self::Pause,
            "seeking" => Self::Seeking,
            "seeked" => Self::Seeked,
            "ratechange" => Self::RateChange,
            "timeupdate" => Self::TimeUpdate,
            "durationchange" => Self::DurationChange,
            _ => return None,
        })
    }
}

/// Display mode of one text track.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTrackMode {
    Disabled,
    Hidden,
    Showing,
}

/// Snapshot of one text track attached to a transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTrackInfo {
    pub label: String,
    pub mode: TextTrackMode,
}

/// Controllable playback resource.
///
/// `play`, `pause` and `set_current_time` are expected to update `is_paused` / `is_seeking`
/// synchronously and to raise the matching event later (possibly re-entrantly).
pub trait Transport {
    /// Start playback. `Err` means the platform refused synchronously; no `play` event
    /// will follow.
    fn play(&mut self) -> Result<(), TransportError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;
    /// Start a seek. The transport clamps the target to its own bounds.
    fn set_current_time(&mut self, seconds: f64);
    /// Total length in seconds; `NaN` until metadata is known.
    fn duration(&self) -> f64;
    fn is_seeking(&self) -> bool;

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);

    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);

    /// Discard buffered state and bind `source` (or nothing). Resets the clock to zero.
    fn load(&mut self, source: Option<&MediaContent>);

    /// Text tracks in transport order. Audio-only transports have none.
    fn text_tracks(&self) -> Vec<TextTrackInfo> {
        Vec::new()
    }

    fn set_text_track_mode(&mut self, _index: usize, _mode: TextTrackMode) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_pair_up() {
        assert_eq!(Role::Primary.other(), Role::Secondary);
        assert_eq!(Role::Secondary.other(), Role::Primary);
        assert_ne!(Role::Primary.index(), Role::Secondary.index());
    }

    #[test]
    fn dom_names_map_to_events() {
        assert_eq!(TransportEvent::from_dom_name("seeked"), Some(TransportEvent::Seeked));
        assert_eq!(
            TransportEvent::from_dom_name("durationchange"),
            Some(TransportEvent::DurationChange)
        );
        assert_eq!(TransportEvent::from_dom_name("volumechange"), None);
    }
}
