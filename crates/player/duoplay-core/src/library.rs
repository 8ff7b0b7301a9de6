//! The set of resources a player can choose from, and the current choice.

use serde::{Deserialize, Serialize};

use crate::content::{ContentKind, MediaContent};
use crate::error::DuoplayError;
use crate::ids::{ContentId, IdAllocator};

/// Added resources grouped by kind. The first resource of each kind is selected
/// automatically; later additions leave the selection alone.
#[derive(Debug, Default)]
pub struct TrackLibrary {
    ids: IdAllocator,
    videos: Vec<MediaContent>,
    audios: Vec<MediaContent>,
    subtitles: Vec<MediaContent>,
    selection: Selection,
}

/// Selected resource per kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub video: Option<ContentId>,
    pub audio: Option<ContentId>,
    pub subtitles: Option<ContentId>,
}

impl Selection {
    fn slot_mut(&mut self, kind: ContentKind) -> &mut Option<ContentId> {
        match kind {
            ContentKind::Video => &mut self.video,
            ContentKind::Audio => &mut self.audio,
            ContentKind::Subtitles => &mut self.subtitles,
        }
    }
}

impl TrackLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and return its id.
    pub fn add(
        &mut self,
        kind: ContentKind,
        url: impl Into<String>,
        name: impl Into<String>,
        mime: impl Into<String>,
    ) -> ContentId {
        let id = self.ids.alloc_content();
        self.list_mut(kind).push(MediaContent::new(id, url, name, mime));
        self.selection.slot_mut(kind).get_or_insert(id);
        id
    }

    /// Select `id` for `kind`, or clear the slot with `None`.
    pub fn select(&mut self, kind: ContentKind, id: Option<ContentId>) -> Result<(), DuoplayError> {
        if let Some(id) = id {
            if !self.list(kind).iter().any(|c| c.id == id) {
                return Err(DuoplayError::ContentNotFound { id: id.0 });
            }
        }
        *self.selection.slot_mut(kind) = id;
        Ok(())
    }

    pub fn list(&self, kind: ContentKind) -> &[MediaContent] {
        match kind {
            ContentKind::Video => &self.videos,
            ContentKind::Audio => &self.audios,
            ContentKind::Subtitles => &self.subtitles,
        }
    }

    fn list_mut(&mut self, kind: ContentKind) -> &mut Vec<MediaContent> {
        match kind {
            ContentKind::Video => &mut self.videos,
            ContentKind::Audio => &mut self.audios,
            ContentKind::Subtitles => &mut self.subtitles,
        }
    }

    pub fn get(&self, id: ContentId) -> Option<&MediaContent> {
        self.videos
            .iter()
            .chain(&self.audios)
            .chain(&self.subtitles)
            .find(|c| c.id == id)
    }

    #[inline]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The selected (video, audio, subtitles), ready for `SyncEngine::apply_sources`.
    pub fn selected(
        &self,
    ) -> (
        Option<&MediaContent>,
        Option<&MediaContent>,
        Option<&MediaContent>,
    ) {
        (
            self.lookup(self.selection.video),
            self.lookup(self.selection.audio),
            self.lookup(self.selection.subtitles),
        )
    }

    fn lookup(&self, id: Option<ContentId>) -> Option<&MediaContent> {
        id.and_then(|id| self.get(id))
    }

    /// Window title carrying the selected video's name.
    pub fn window_title(&self, base: &str) -> String {
        match self.selected().0 {
            Some(video) => format!("{} - {base}", video.name),
            None => base.to_owned(),
        }
    }
}
