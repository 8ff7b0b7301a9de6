//! Media resource descriptors.

use serde::{Deserialize, Serialize};

use crate::ids::ContentId;

/// The kind of transport a resource is played on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Audio,
    Subtitles,
}

impl ContentKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitles => "subtitles",
        }
    }

    /// Inverse of [`ContentKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "subtitles" => Some(Self::Subtitles),
            _ => None,
        }
    }
}

/// One selectable media resource.
///
/// Equality is identity: two descriptors compare equal iff their `id`s match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaContent {
    pub id: ContentId,
    pub url: String,
    /// Display name; subtitle tracks are matched against transport text tracks by this label.
    pub name: String,
    /// MIME type, e.g. `video/mp4` or `text/vtt`.
    #[serde(default)]
    pub mime: String,
}

impl MediaContent {
    pub fn new(
        id: ContentId,
        url: impl Into<String>,
        name: impl Into<String>,
        mime: impl Into<String>,
    ) -> Self {
        Self {
            id,
            url: url.into(),
            name: name.into(),
            mime: mime.into(),
        }
    }
}

impl PartialEq for MediaContent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MediaContent {}

/// Identity of an optional slot.
#[inline]
pub(crate) fn slot_id(content: Option<&MediaContent>) -> Option<ContentId> {
    content.map(|c| c.id)
}
