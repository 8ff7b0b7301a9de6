//! Last-applied source selection.

use serde::{Deserialize, Serialize};

use crate::content::{slot_id, MediaContent};
use crate::outputs::ReloadSet;

/// The (video, audio, subtitles) selection most recently applied to the transports.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTriple {
    pub video: Option<MediaContent>,
    pub audio: Option<MediaContent>,
    pub subtitles: Option<MediaContent>,
}

impl SourceTriple {
    /// Slots whose identity differs from the incoming selection.
    pub fn diff(
        &self,
        video: Option<&MediaContent>,
        audio: Option<&MediaContent>,
        subtitles: Option<&MediaContent>,
    ) -> ReloadSet {
        ReloadSet {
            video: slot_id(self.video.as_ref()) != slot_id(video),
            audio: slot_id(self.audio.as_ref()) != slot_id(audio),
            subtitles: slot_id(self.subtitles.as_ref()) != slot_id(subtitles),
        }
    }

    pub fn replace(
        &mut self,
        video: Option<&MediaContent>,
        audio: Option<&MediaContent>,
        subtitles: Option<&MediaContent>,
    ) {
        self.video = video.cloned();
        self.audio = audio.cloned();
        self.subtitles = subtitles.cloned();
    }

    #[inline]
    pub fn has_secondary_audio(&self) -> bool {
        self.audio.is_some()
    }
}
