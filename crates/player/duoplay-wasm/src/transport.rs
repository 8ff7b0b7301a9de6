//! `Transport` over a DOM media element.

use std::rc::Weak;

use duoplay_core::{
    MediaContent, Role, TextTrackInfo, TextTrackMode, Transport, TransportError, TransportEvent,
};
use log::{debug, warn};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlMediaElement;

use crate::host::Host;

/// Media element events forwarded to the engine.
pub(crate) const MEDIA_EVENTS: [&str; 7] = [
    "play",
    "pause",
    "seeking",
    "seeked",
    "ratechange",
    "timeupdate",
    "durationchange",
];

pub struct WebTransport {
    role: Role,
    element: HtmlMediaElement,
    host: Weak<Host>,
}

impl WebTransport {
    pub(crate) fn new(role: Role, element: HtmlMediaElement, host: Weak<Host>) -> Self {
        Self {
            role,
            element,
            host,
        }
    }

    pub fn element(&self) -> &HtmlMediaElement {
        &self.element
    }
}

fn error_name(err: &JsValue) -> Option<String> {
    js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
}

/// Best-effort name of a rejection value (`NotAllowedError`, `AbortError`, ...).
pub(crate) fn describe(err: &JsValue) -> String {
    error_name(err)
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "play() was refused".to_owned())
}

/// Event for a rejected `play()` promise. `AbortError` means a later `pause()` or `load()`
/// interrupted the play, which the engine already knows about.
pub(crate) fn rejection_event(err: &JsValue) -> Option<TransportEvent> {
    if error_name(err).as_deref() == Some("AbortError") {
        return None;
    }
    Some(TransportEvent::PlayRejected {
        reason: describe(err),
    })
}

fn to_dom_mode(mode: TextTrackMode) -> web_sys::TextTrackMode {
    match mode {
        TextTrackMode::Disabled => web_sys::TextTrackMode::Disabled,
        TextTrackMode::Hidden => web_sys::TextTrackMode::Hidden,
        TextTrackMode::Showing => web_sys::TextTrackMode::Showing,
    }
}

fn from_dom_mode(mode: web_sys::TextTrackMode) -> TextTrackMode {
    match mode {
        web_sys::TextTrackMode::Showing => TextTrackMode::Showing,
        web_sys::TextTrackMode::Hidden => TextTrackMode::Hidden,
        _ => TextTrackMode::Disabled,
    }
}

impl Transport for WebTransport {
    fn play(&mut self) -> Result<(), TransportError> {
        let promise = self
            .element
            .play()
            .map_err(|err| TransportError::play_rejected(describe(&err)))?;

        let host = self.host.clone();
        let role = self.role;
        spawn_local(async move {
            let Err(err) = JsFuture::from(promise).await else {
                return;
            };
            match rejection_event(&err) {
                Some(event) => {
                    if let Some(host) = host.upgrade() {
                        host.deliver(role, event);
                    }
                }
                None => debug!("play() on {} interrupted", role.name()),
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Err(err) = self.element.pause() {
            warn!("pause() failed on {}: {}", self.role.name(), describe(&err));
        }
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn is_seeking(&self) -> bool {
        self.element.seeking()
    }

    fn playback_rate(&self) -> f64 {
        self.element.playback_rate()
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.element.set_playback_rate(rate);
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn is_muted(&self) -> bool {
        self.element.muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }

    fn load(&mut self, source: Option<&MediaContent>) {
        match source {
            Some(content) => self.element.set_src(&content.url),
            None => {
                if let Err(err) = self.element.remove_attribute("src") {
                    warn!("clearing src on {}: {err:?}", self.role.name());
                }
            }
        }
        self.element.load();
    }

    fn text_tracks(&self) -> Vec<TextTrackInfo> {
        let Some(list) = self.element.text_tracks() else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|track| TextTrackInfo {
                label: track.label(),
                mode: from_dom_mode(track.mode()),
            })
            .collect()
    }

    fn set_text_track_mode(&mut self, index: usize, mode: TextTrackMode) {
        let track = self
            .element
            .text_tracks()
            .and_then(|list| u32::try_from(index).ok().and_then(|i| list.get(i)));
        match track {
            Some(track) => track.set_mode(to_dom_mode(mode)),
            None => warn!("no text track #{index} on {}", self.role.name()),
        }
    }
}

impl std::fmt::Debug for WebTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebTransport")
            .field("role", &self.role)
            .field("src", &self.element.current_src())
            .finish()
    }
}
