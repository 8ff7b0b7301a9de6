//! Content sniffing and subtitle normalization for dropped items.
//!
//! Browsers only render WebVTT text tracks, so SubRip input is rewritten before it is
//! handed to the track library.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::content::ContentKind;
use crate::error::DuoplayError;

/// How many leading characters the sniffers look at.
pub const SNIFF_LEN: usize = 50;

const WEBVTT_MAGIC_WINDOW: usize = 20;

static FIRST_CUE: Lazy<Regex> = Lazy::new(|| regex(r"(^|\n)1[\r\n]"));

static CUE_TIMING: Lazy<Regex> = Lazy::new(|| {
    regex(r"[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3} --> [0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}")
});

/// Cue number line, then a timing line whose end time is followed by a separator.
static CUE_TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    regex(r"([0-9 ]+\n[0-9:]{8}),([0-9]{3}) --> ([0-9:]{8}),([0-9]{3}[ \r\n])")
});

fn regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => unreachable!("invalid built-in pattern {pattern}: {err}"),
    }
}

/// Classify by MIME type alone.
pub fn guess_kind_from_mime(mime: &str) -> Option<ContentKind> {
    if mime.starts_with("video/") {
        Some(ContentKind::Video)
    } else if mime.starts_with("audio/") {
        Some(ContentKind::Audio)
    } else {
        None
    }
}

/// Classify by the leading text of the content. Only subtitles are recognizable this way.
pub fn guess_kind_from_text(text: &str) -> Option<ContentKind> {
    if prefix_chars(text, WEBVTT_MAGIC_WINDOW).contains("WEBVTT") || is_subrip(text) {
        Some(ContentKind::Subtitles)
    } else {
        None
    }
}

/// MIME type first, then content.
pub fn guess_kind(mime: &str, head: &str) -> Option<ContentKind> {
    guess_kind_from_mime(mime).or_else(|| guess_kind_from_text(head))
}

/// Like [`guess_kind`], but unrecognized content is an error naming the item.
pub fn classify(name: &str, mime: &str, head: &str) -> Result<ContentKind, DuoplayError> {
    guess_kind(mime, head).ok_or_else(|| DuoplayError::UnrecognizedContent { name: name.into() })
}

/// SubRip files start with cue number `1` on its own line and carry a
/// `hh:mm:ss,mmm --> hh:mm:ss,mmm` timing line near the top.
pub fn is_subrip(text: &str) -> bool {
    let head = prefix_chars(text, SNIFF_LEN);
    FIRST_CUE.is_match(head) && CUE_TIMING.is_match(head)
}

/// Rewrite SubRip text as WebVTT: line endings normalized to `\n`, millisecond commas in
/// cue timings turned into dots, `WEBVTT` header prepended.
pub fn subrip_to_webvtt(srt: &str) -> String {
    let text = srt.replace("\r\n", "\n");
    let body = CUE_TIMING_LINE.replace_all(&text, "${1}.${2} --> ${3}.${4}");
    format!("WEBVTT\r\n\r\n{body}\r\n\r\n")
}

/// Subtitle text ready to be attached as a WebVTT track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleText {
    pub name: String,
    pub body: String,
    pub mime: String,
    /// Whether the input was SubRip and got converted.
    pub converted: bool,
}

/// Normalize dropped subtitle text. `file_name` is `None` for pasted/dragged strings,
/// which get a synthetic name.
pub fn normalize_subtitles(file_name: Option<&str>, text: &str) -> SubtitleText {
    let converted = is_subrip(text);
    let body = if converted {
        subrip_to_webvtt(text)
    } else {
        text.to_owned()
    };

    let name = match file_name {
        Some(name) if converted => format!("{name}.vtt"),
        Some(name) => name.to_owned(),
        None => format!(
            "subtitles_{}.{}.vtt",
            body.chars().count(),
            if converted { "srt" } else { "" }
        ),
    };

    SubtitleText {
        name,
        body,
        mime: "text/vtt".into(),
        converted,
    }
}

fn prefix_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRT: &str = "1\r\n00:00:01,000 --> 00:00:04,250\r\nHello\r\n\r\n\
                       2\r\n00:00:05,000 --> 00:00:06,000\r\nWorld\r\n";

    #[test]
    fn mime_prefixes() {
        assert_eq!(guess_kind_from_mime("video/mp4"), Some(ContentKind::Video));
        assert_eq!(guess_kind_from_mime("audio/ogg"), Some(ContentKind::Audio));
        assert_eq!(guess_kind_from_mime("text/plain"), None);
    }

    #[test]
    fn webvtt_and_subrip_are_subtitles() {
        let vtt = "WEBVTT\n\n00:01.000 --> 00:02.000";
        assert_eq!(guess_kind_from_text(vtt), Some(ContentKind::Subtitles));
        assert_eq!(guess_kind_from_text(SRT), Some(ContentKind::Subtitles));
        assert_eq!(guess_kind_from_text("just some notes"), None);
        assert_eq!(guess_kind("", SRT), Some(ContentKind::Subtitles));
        assert_eq!(guess_kind("video/webm", SRT), Some(ContentKind::Video));
    }

    #[test]
    fn subrip_needs_first_cue_and_timing() {
        assert!(is_subrip(SRT));
        assert!(!is_subrip("2\n00:00:01,000 --> 00:00:04,250\n"));
        assert!(!is_subrip("1\nno timing here at all"));
    }

    #[test]
    fn conversion_rewrites_timings_only() {
        let vtt = subrip_to_webvtt(SRT);
        assert!(vtt.starts_with("WEBVTT\r\n\r\n1\n00:00:01.000 --> 00:00:04.250\nHello\n"));
        assert!(vtt.contains("2\n00:00:05.000 --> 00:00:06.000\nWorld"));
        assert!(vtt.ends_with("\r\n\r\n"));
        assert!(!vtt.contains(",000"));
    }

    #[test]
    fn timing_without_trailing_separator_is_left_alone() {
        let vtt = subrip_to_webvtt("1\n00:00:01,000 --> 00:00:02,000");
        assert!(vtt.contains("00:00:01,000 --> 00:00:02,000"));

        let padded = subrip_to_webvtt("1\n00:00:01,000 --> 00:00:02,000 \nHi");
        assert!(padded.contains("00:00:01.000 --> 00:00:02.000 \nHi"));
    }

    #[test]
    fn cue_number_line_may_carry_spaces() {
        let vtt = subrip_to_webvtt(" 12 \n00:01:00,500 --> 00:01:02,000\ntext\n");
        assert!(vtt.contains(" 12 \n00:01:00.500 --> 00:01:02.000\n"));
    }

    #[test]
    fn first_cue_must_be_its_own_line() {
        assert!(is_subrip("\n1\r\n00:00:01,000 --> 00:00:04,250\r\n"));
        assert!(!is_subrip("11\n00:00:01,000 --> 00:00:04,250\n"));
    }

    #[test]
    fn normalized_names() {
        let from_file = normalize_subtitles(Some("movie.srt"), SRT);
        assert!(from_file.converted);
        assert_eq!(from_file.name, "movie.srt.vtt");

        let vtt = "WEBVTT\n\n00:01.000 --> 00:02.000\nhi\n";
        let untouched = normalize_subtitles(Some("movie.vtt"), vtt);
        assert!(!untouched.converted);
        assert_eq!(untouched.name, "movie.vtt");
        assert_eq!(untouched.body, vtt);

        let dropped = normalize_subtitles(None, SRT);
        assert!(dropped.name.starts_with("subtitles_"));
        assert!(dropped.name.ends_with(".srt.vtt"));
    }

    #[test]
    fn unrecognized_content_is_an_error() {
        let err = classify("notes.txt", "text/plain", "hello").unwrap_err();
        assert_eq!(err.category(), "content");
    }
}
