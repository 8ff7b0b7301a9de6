//! Scriptable transports and an event pump for exercising `SyncEngine` without a browser.
//!
//! Both mocks push their notifications onto one shared [`EventBus`] so the harness can
//! deliver them in the global order they were raised, the way a browser event loop would.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{bail, Result};
use duoplay_core::{
    Config, ContentId, MediaContent, Role, SyncEngine, TextTrackInfo, TextTrackMode, Transport,
    TransportError, TransportEvent,
};

/// Notifications raised by either mock, in raise order.
pub type EventBus = Rc<RefCell<VecDeque<(Role, TransportEvent)>>>;

/// Length given to any source a mock loads.
pub const MEDIA_DURATION: f64 = 120.0;

/// One command a mock received.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Play,
    Pause,
    SetCurrentTime(f64),
    SetPlaybackRate(f64),
    SetVolume(f64),
    SetMuted(bool),
    Load(Option<ContentId>),
    SetTextTrackMode(usize, TextTrackMode),
}

/// How a mock answers `play()`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayPolicy {
    #[default]
    Allow,
    /// Refuse synchronously (`Err`).
    RejectSync,
    /// Accept the call, then report a rejected play promise.
    RejectAsync,
}

/// In-memory media element. State changes are synchronous; events go to the bus.
#[derive(Debug)]
pub struct MockTransport {
    role: Role,
    bus: EventBus,

    pub paused: bool,
    pub current_time: f64,
    pub duration: f64,
    pub seeking: bool,
    pub rate: f64,
    pub volume: f64,
    pub muted: bool,
    pub source: Option<ContentId>,
    pub text_tracks: Vec<TextTrackInfo>,
    pub play_policy: PlayPolicy,

    commands: Vec<Command>,
}

impl MockTransport {
    pub fn new(role: Role, bus: EventBus) -> Self {
        Self {
            role,
            bus,
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            seeking: false,
            rate: 1.0,
            volume: 1.0,
            muted: false,
            source: None,
            text_tracks: Vec::new(),
            play_policy: PlayPolicy::Allow,
            commands: Vec::new(),
        }
    }

    fn emit(&self, event: TransportEvent) {
        self.bus.borrow_mut().push_back((self.role, event));
    }

    /// Every command received so far.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn plays(&self) -> usize {
        self.count(|c| *c == Command::Play)
    }

    pub fn pauses(&self) -> usize {
        self.count(|c| *c == Command::Pause)
    }

    pub fn is_running(&self) -> bool {
        !self.paused
    }

    pub fn add_text_track(&mut self, label: &str, mode: TextTrackMode) {
        self.text_tracks.push(TextTrackInfo {
            label: label.into(),
            mode,
        });
    }

    /// Complete an in-flight seek.
    pub fn finish_seek(&mut self) {
        if self.seeking {
            self.seeking = false;
            self.emit(TransportEvent::Seeked);
        }
    }

    /// Simulate playback progress.
    pub fn advance(&mut self, seconds: f64) {
        if self.paused || self.seeking {
            return;
        }
        self.current_time += seconds * self.rate;
        if self.duration.is_finite() {
            self.current_time = self.current_time.min(self.duration);
        }
        self.emit(TransportEvent::TimeUpdate);
    }

    /// Native controls, media keys or the platform started playback.
    pub fn external_play(&mut self) {
        if self.paused {
            self.paused = false;
            self.emit(TransportEvent::Play);
        }
    }

    /// Native controls, a buffering stall or the platform paused playback.
    pub fn external_pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.emit(TransportEvent::Pause);
        }
    }

    /// Native controls moved the playhead.
    pub fn external_seek(&mut self, seconds: f64) {
        self.seek_to(seconds);
    }

    fn seek_to(&mut self, seconds: f64) {
        let mut target = seconds.max(0.0);
        if self.duration.is_finite() {
            target = target.min(self.duration);
        }
        self.current_time = target;
        if self.source.is_some() {
            self.seeking = true;
            self.emit(TransportEvent::Seeking);
        }
    }
}

impl Transport for MockTransport {
    fn play(&mut self) -> Result<(), TransportError> {
        self.commands.push(Command::Play);
        match self.play_policy {
            PlayPolicy::RejectSync => Err(TransportError::play_rejected("NotAllowedError")),
            PlayPolicy::RejectAsync => {
                self.emit(TransportEvent::PlayRejected {
                    reason: "NotAllowedError".into(),
                });
                Ok(())
            }
            PlayPolicy::Allow => {
                if self.paused {
                    self.paused = false;
                    self.emit(TransportEvent::Play);
                }
                Ok(())
            }
        }
    }

    fn pause(&mut self) {
        self.commands.push(Command::Pause);
        if !self.paused {
            self.paused = true;
            self.emit(TransportEvent::Pause);
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.commands.push(Command::SetCurrentTime(seconds));
        self.seek_to(seconds);
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_seeking(&self) -> bool {
        self.seeking
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.commands.push(Command::SetPlaybackRate(rate));
        if self.rate != rate {
            self.rate = rate;
            self.emit(TransportEvent::RateChange);
        }
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.commands.push(Command::SetVolume(volume));
        self.volume = volume;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.commands.push(Command::SetMuted(muted));
        self.muted = muted;
    }

    fn load(&mut self, source: Option<&MediaContent>) {
        self.commands.push(Command::Load(source.map(|c| c.id)));
        // Loading drops any notification still queued for this element.
        let role = self.role;
        self.bus.borrow_mut().retain(|(r, _)| *r != role);

        self.source = source.map(|c| c.id);
        self.paused = true;
        self.seeking = false;
        self.current_time = 0.0;
        if self.source.is_some() {
            self.duration = MEDIA_DURATION;
            self.emit(TransportEvent::DurationChange);
        } else {
            self.duration = f64::NAN;
        }
    }

    fn text_tracks(&self) -> Vec<TextTrackInfo> {
        self.text_tracks.clone()
    }

    fn set_text_track_mode(&mut self, index: usize, mode: TextTrackMode) {
        self.commands.push(Command::SetTextTrackMode(index, mode));
        if let Some(track) = self.text_tracks.get_mut(index) {
            track.mode = mode;
        }
    }
}

pub type MockEngine = SyncEngine<MockTransport, MockTransport>;

/// A `SyncEngine` over two mocks plus the shared bus.
pub struct Harness {
    pub engine: MockEngine,
    bus: EventBus,
    max_iterations: usize,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(cfg: Config) -> Self {
        let bus: EventBus = Rc::new(RefCell::new(VecDeque::new()));
        let max_iterations = cfg.max_pump_iterations;
        let primary = MockTransport::new(Role::Primary, Rc::clone(&bus));
        let secondary = MockTransport::new(Role::Secondary, Rc::clone(&bus));
        Self {
            engine: SyncEngine::new(cfg, primary, secondary),
            bus,
            max_iterations,
        }
    }

    pub fn primary(&mut self) -> &mut MockTransport {
        self.engine.primary_mut()
    }

    pub fn secondary(&mut self) -> &mut MockTransport {
        self.engine.secondary_mut()
    }

    pub fn transport(&mut self, role: Role) -> &mut MockTransport {
        match role {
            Role::Primary => self.engine.primary_mut(),
            Role::Secondary => self.engine.secondary_mut(),
        }
    }

    /// Events raised but not yet delivered.
    pub fn queued(&self) -> Vec<(Role, TransportEvent)> {
        self.bus.borrow().iter().cloned().collect()
    }

    /// Deliver queued events until none remain. Fails if the engine keeps generating
    /// events past the configured bound (a feedback loop).
    pub fn pump(&mut self) -> Result<usize> {
        let mut delivered = 0;
        loop {
            let next = self.bus.borrow_mut().pop_front();
            let Some((role, event)) = next else {
                return Ok(delivered);
            };
            if delivered >= self.max_iterations {
                bail!(
                    "event pump exceeded {} deliveries; last was {event:?} on {}",
                    self.max_iterations,
                    role.name()
                );
            }
            log::trace!("deliver {event:?} to {}", role.name());
            self.engine.handle_event(role, event);
            delivered += 1;
        }
    }

    /// Complete the seek on `role`, then pump.
    pub fn finish_seek(&mut self, role: Role) -> Result<usize> {
        self.transport(role).finish_seek();
        self.pump()
    }

    /// Complete pending seeks on both transports (primary first), pumping after each.
    pub fn settle(&mut self) -> Result<()> {
        self.pump()?;
        self.finish_seek(Role::Primary)?;
        self.finish_seek(Role::Secondary)?;
        Ok(())
    }

    /// Bind sources and let the restorative seek complete.
    pub fn load(
        &mut self,
        video: Option<&MediaContent>,
        audio: Option<&MediaContent>,
        subtitles: Option<&MediaContent>,
    ) -> Result<()> {
        self.engine.apply_sources(video, audio, subtitles);
        self.settle()
    }

    /// Start playback from a loaded state and deliver the echoes.
    pub fn start(&mut self) -> Result<()> {
        self.engine.play();
        self.pump()?;
        Ok(())
    }
}

/// A content descriptor with a predictable url.
pub fn content(id: u32, name: &str) -> MediaContent {
    let mime = if name.ends_with(".vtt") {
        "text/vtt"
    } else if name.ends_with(".ogg") || name.ends_with(".m4a") {
        "audio/ogg"
    } else {
        "video/mp4"
    };
    MediaContent::new(ContentId(id), format!("blob:mock/{id}"), name, mime)
}

/// A harness with a video and an audio source bound and settled.
pub fn loaded_pair() -> Result<(Harness, MediaContent, MediaContent)> {
    let mut h = Harness::new();
    let video = content(1, "movie.mp4");
    let audio = content(2, "dub.ogg");
    h.load(Some(&video), Some(&audio), None)?;
    h.primary().clear_commands();
    h.secondary().clear_commands();
    h.engine.drain_events();
    Ok((h, video, audio))
}
