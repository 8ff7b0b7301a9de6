use std::rc::Rc;

use js_sys::{Array, Function};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlMediaElement, HtmlTrackElement, Url};

use duoplay_core::{
    guess_kind, normalize_subtitles, Config, ContentId, ContentKind, DuoplayError, MediaContent,
    MuteToggle, Role, SeekPhase, Selection, TrackLibrary, VolumeLevel,
};

mod host;
mod logging;
mod transport;

pub use transport::WebTransport;

use host::Host;

/// Plays a `<video>` element and a separately sourced `<audio>` element as one player.
#[wasm_bindgen]
pub struct DuoPlayer {
    host: Rc<Host>,
    video: HtmlMediaElement,
    library: TrackLibrary,
    mute: MuteToggle,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn core_err(e: DuoplayError) -> JsError {
    JsError::new(&format!("{} error: {e}", e.category()))
}

fn content_from_js(value: JsValue) -> Result<Option<MediaContent>, JsError> {
    if jsvalue_is_undefined_or_null(&value) {
        return Ok(None);
    }
    swb::from_value(value)
        .map(Some)
        .map_err(|e| JsError::new(&format!("content descriptor error: {e}")))
}

fn parse_kind(kind: &str) -> Result<ContentKind, JsError> {
    ContentKind::from_name(kind).ok_or_else(|| {
        JsError::new(&format!(
            "unknown content kind '{kind}' (expected video, audio or subtitles)"
        ))
    })
}

/// Everything a control bar renders, in one object.
#[derive(Serialize)]
struct PlayerState {
    playing: bool,
    current: f64,
    total: f64,
    volume: f64,
    seek: SeekPhase,
    selection: Selection,
}

#[wasm_bindgen]
impl DuoPlayer {
    /// Bind a player to two media elements. Pass a JSON config object or
    /// undefined/null for defaults.
    /// Example:
    ///   new DuoPlayer(videoEl, audioEl, { drift_tolerance: 0.25 })
    #[wasm_bindgen(constructor)]
    pub fn new(
        video: HtmlMediaElement,
        audio: HtmlMediaElement,
        config: JsValue,
    ) -> Result<DuoPlayer, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        cfg.validate().map_err(core_err)?;

        let host = Host::new(cfg, video.clone(), audio.clone());
        host.attach(Role::Primary, &video)
            .and_then(|()| host.attach(Role::Secondary, &audio))
            .map_err(|e| JsError::new(&format!("listener error: {e:?}")))?;

        Ok(DuoPlayer {
            host,
            video,
            library: TrackLibrary::new(),
            mute: MuteToggle::new(),
        })
    }

    /// Register `listener(event)` for engine events, or clear it with null/undefined.
    /// Events are objects tagged by `type` (`play_state_changed`, `time_changed`, ...).
    #[wasm_bindgen(js_name = on_change)]
    pub fn on_change(&self, listener: Option<Function>) {
        self.host.set_on_change(listener);
    }

    pub fn play(&self) -> Result<(), JsError> {
        self.host.command(|engine| engine.play())
    }

    pub fn pause(&self) -> Result<(), JsError> {
        self.host.command(|engine| engine.pause())
    }

    /// Flip between playing and paused based on the current intent.
    #[wasm_bindgen(js_name = toggle_play)]
    pub fn toggle_play(&self) -> Result<bool, JsError> {
        self.host.command(|engine| {
            if engine.is_playing() {
                engine.pause();
            } else {
                engine.play();
            }
            engine.is_playing()
        })
    }

    pub fn seek(&self, seconds: f64) -> Result<(), JsError> {
        self.host.command(|engine| engine.seek(seconds))
    }

    #[wasm_bindgen(js_name = set_volume)]
    pub fn set_volume(&self, volume: f64) -> Result<(), JsError> {
        self.host.command(|engine| engine.set_volume(volume))
    }

    /// Mute-button press: drop to 0 and remember the level, or restore it. Returns the new
    /// volume.
    #[wasm_bindgen(js_name = toggle_mute)]
    pub fn toggle_mute(&mut self) -> Result<f64, JsError> {
        let mute = &mut self.mute;
        self.host.command(|engine| {
            let next = mute.toggle(engine.volume());
            engine.set_volume(next);
            engine.volume()
        })
    }

    #[wasm_bindgen(js_name = set_playback_rate)]
    pub fn set_playback_rate(&self, rate: f64) -> Result<(), JsError> {
        self.host.command(|engine| engine.set_playback_rate(rate))
    }

    /// Register a resource. `kind` is "video", "audio" or "subtitles". Returns its id.
    /// The first resource of each kind becomes the selection.
    #[wasm_bindgen(js_name = add_content)]
    pub fn add_content(
        &mut self,
        kind: &str,
        url: String,
        name: String,
        mime: String,
    ) -> Result<u32, JsError> {
        let kind = parse_kind(kind)?;
        Ok(self.library.add(kind, url, name, mime).0)
    }

    /// Register dropped subtitle text (SubRip is converted to WebVTT) and attach it to the
    /// video element as a `<track>`. Returns its id.
    #[wasm_bindgen(js_name = add_subtitles)]
    pub fn add_subtitles(&mut self, file_name: Option<String>, text: &str) -> Result<u32, JsError> {
        let subtitles = normalize_subtitles(file_name.as_deref(), text);
        let url = subtitle_blob_url(&subtitles.body, &subtitles.mime)
            .map_err(|e| JsError::new(&format!("subtitle blob error: {e:?}")))?;
        self.attach_track(&subtitles.name, &url)
            .map_err(|e| JsError::new(&format!("subtitle track error: {e:?}")))?;
        let id = self
            .library
            .add(ContentKind::Subtitles, url, subtitles.name, subtitles.mime);
        Ok(id.0)
    }

    /// Select a resource of `kind`, or clear the slot with null/undefined.
    /// Takes effect on the next `apply_selection`.
    pub fn select(&mut self, kind: &str, id: Option<u32>) -> Result<(), JsError> {
        let kind = parse_kind(kind)?;
        self.library
            .select(kind, id.map(ContentId))
            .map_err(core_err)
    }

    /// Push the current selection to the transports.
    #[wasm_bindgen(js_name = apply_selection)]
    pub fn apply_selection(&self) -> Result<(), JsError> {
        let (video, audio, subtitles) = self.library.selected();
        self.host.command(|engine| engine.apply_sources(video, audio, subtitles))
    }

    /// Bind explicit `{ id, url, name, mime }` descriptors (or null) without going through
    /// the library.
    #[wasm_bindgen(js_name = apply_sources)]
    pub fn apply_sources(
        &self,
        video: JsValue,
        audio: JsValue,
        subtitles: JsValue,
    ) -> Result<(), JsError> {
        let video = content_from_js(video)?;
        let audio = content_from_js(audio)?;
        let subtitles = content_from_js(subtitles)?;
        self.host.command(|engine| {
            engine.apply_sources(video.as_ref(), audio.as_ref(), subtitles.as_ref())
        })
    }

    /// Registered resources of `kind` as an array of `{ id, url, name, mime }`.
    pub fn content(&self, kind: &str) -> Result<JsValue, JsError> {
        let kind = parse_kind(kind)?;
        swb::to_value(self.library.list(kind))
            .map_err(|e| JsError::new(&format!("content error: {e}")))
    }

    #[wasm_bindgen(js_name = window_title)]
    pub fn window_title(&self, base: &str) -> String {
        self.library.window_title(base)
    }

    #[wasm_bindgen(js_name = is_playing)]
    pub fn is_playing(&self) -> bool {
        self.host.read(|engine| engine.is_playing())
    }

    #[wasm_bindgen(js_name = current_time)]
    pub fn current_time(&self) -> f64 {
        self.host.read(|engine| engine.time().current)
    }

    #[wasm_bindgen(js_name = total_time)]
    pub fn total_time(&self) -> f64 {
        self.host.read(|engine| engine.time().total)
    }

    pub fn volume(&self) -> f64 {
        self.host.read(|engine| engine.volume())
    }

    /// Snapshot of playback state and selection.
    pub fn state(&self) -> Result<JsValue, JsError> {
        let selection = self.library.selection();
        let state = self.host.read(|engine| {
            let time = engine.time();
            Some(PlayerState {
                playing: engine.is_playing(),
                current: time.current,
                total: time.total,
                volume: engine.volume(),
                seek: engine.seek_phase(),
                selection,
            })
        });
        let state = state.ok_or_else(|| JsError::new("engine is busy"))?;
        swb::to_value(&state).map_err(|e| JsError::new(&format!("state error: {e}")))
    }

    fn attach_track(&self, label: &str, url: &str) -> Result<(), JsValue> {
        let document = self
            .video
            .owner_document()
            .ok_or_else(|| JsValue::from_str("video element has no document"))?;
        let track: HtmlTrackElement = document.create_element("track")?.dyn_into()?;
        track.set_kind("subtitles");
        track.set_label(label);
        track.set_src(url);
        self.video.append_child(&track)?;
        Ok(())
    }
}

fn subtitle_blob_url(body: &str, mime: &str) -> Result<String, JsValue> {
    let parts = Array::of1(&JsValue::from_str(body));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    Url::create_object_url_with_blob(&blob)
}

/// Install the console logger at `level` ("off", "error", "warn", "info", "debug", "trace").
#[wasm_bindgen(js_name = init_logging)]
pub fn init_logging(level: &str) {
    logging::init(logging::parse_level(level));
}

/// `m:ss` or `h:mm:ss`.
#[wasm_bindgen(js_name = format_duration)]
pub fn format_duration(seconds: f64) -> String {
    duoplay_core::format_duration(seconds)
}

/// Speaker glyph for a volume level.
#[wasm_bindgen(js_name = volume_icon)]
pub fn volume_icon(volume: f64) -> String {
    VolumeLevel::from_volume(volume).icon().to_owned()
}

/// Classify a dropped resource by MIME type, then by its first characters.
/// Returns "video", "audio", "subtitles" or undefined.
#[wasm_bindgen(js_name = guess_content_kind)]
pub fn guess_content_kind(mime: &str, head: &str) -> Option<String> {
    guess_kind(mime, head).map(|kind| kind.name().to_owned())
}

#[wasm_bindgen(js_name = subrip_to_webvtt)]
pub fn subrip_to_webvtt(srt: &str) -> String {
    duoplay_core::subrip_to_webvtt(srt)
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
