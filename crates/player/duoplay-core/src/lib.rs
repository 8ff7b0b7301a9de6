//! Duoplay Core (engine-agnostic)
//!
//! Plays a video-only transport and an independently sourced audio transport as one
//! logical stream. The [`SyncEngine`] owns the play/pause intent, echo suppression, seek
//! coordination, rate/volume mirroring and source swapping; hosts (the browser adapter,
//! test harnesses) implement [`Transport`] and feed transport events back into it.
//!
//! The remaining modules are the small helpers a player UI needs around the engine:
//! a track library, content sniffing, volume and time formatting.

pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod format;
pub mod ids;
pub mod ingest;
pub mod library;
pub mod outputs;
pub mod seek;
pub mod sources;
pub mod suppression;
pub mod transport;
pub mod volume;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use content::{ContentKind, MediaContent};
pub use engine::SyncEngine;
pub use error::{DuoplayError, TransportError};
pub use format::format_duration;
pub use ids::ContentId;
pub use ingest::{guess_kind, normalize_subtitles, subrip_to_webvtt, SubtitleText};
pub use library::{Selection, TrackLibrary};
pub use outputs::{EngineEvent, ReloadSet, TimeSnapshot};
pub use seek::SeekPhase;
pub use sources::SourceTriple;
pub use suppression::{EchoKind, Suppression};
pub use transport::{Role, TextTrackInfo, TextTrackMode, Transport, TransportEvent};
pub use volume::{MuteToggle, VolumeLevel};
